use super::RenderContext;
use super::canvas::{Canvas, Rgb, Watermark};
use crate::constants::{WATERMARK_ANGLE_DEG, WATERMARK_FONT_SIZE, WATERMARK_OPACITY};
use crate::types::*;

const WATERMARK_COLOR: Rgb = Rgb(120, 100, 160);

/// Place the watermark on every page after the cover
pub(crate) fn apply_watermark(canvas: &mut Canvas, ctx: &RenderContext<'_>) -> Result<()> {
    if !ctx.settings.has_watermark() {
        return Ok(());
    }
    let geometry = ctx.geometry;
    for index in ctx.plan.watermark_start()..canvas.page_count() {
        canvas.set_active_page(index)?;
        canvas.draw_watermark(Watermark {
            text: ctx.settings.watermark_text.clone(),
            center_mm: (geometry.center_x_mm(), geometry.page_height_mm / 2.0),
            size_pt: WATERMARK_FONT_SIZE,
            angle_deg: WATERMARK_ANGLE_DEG,
            opacity: WATERMARK_OPACITY,
            color: WATERMARK_COLOR,
        })?;
    }
    Ok(())
}
