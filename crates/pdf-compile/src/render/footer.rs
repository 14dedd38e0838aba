//! Page footers
//!
//! A footer is a pure function of the finished plan and the page index, so
//! stamping can run any number of times over any range with the same result.

use super::RenderContext;
use super::canvas::{Align, Canvas, Rgb, TextRun};
use crate::constants::FOOTER_FONT_SIZE;
use crate::layout::PageKind;
use crate::types::*;
use std::ops::Range;

const FOOTER_COLOR: Rgb = Rgb(160, 160, 170);

/// Footer runs for the 0-based page `index`; empty for the cover
pub fn footer_for(ctx: &RenderContext<'_>, index: usize) -> Vec<TextRun> {
    let geometry = ctx.geometry;
    let baseline = geometry.footer_baseline_mm();
    let run = |text: String, x: f32, align: Align| {
        TextRun::new(text, x, baseline)
            .size(FOOTER_FONT_SIZE)
            .color(FOOTER_COLOR)
            .align(align)
    };

    match ctx.plan.pages.get(index) {
        None | Some(PageKind::Cover) => Vec::new(),
        Some(PageKind::Toc { toc_page, .. }) => {
            let label = if ctx.plan.toc_page_count > 1 {
                format!("Table of Contents ({}/{})", toc_page + 1, ctx.plan.toc_page_count)
            } else {
                "Table of Contents".to_string()
            };
            vec![run(label, geometry.center_x_mm(), Align::Center)]
        }
        Some(PageKind::Content { .. }) => vec![
            run(ctx.project.name.clone(), geometry.margin_mm, Align::Left),
            run(
                format!("Page {} of {}", index + 1, ctx.plan.total_pages()),
                geometry.center_x_mm(),
                Align::Center,
            ),
            run(
                ctx.generated_at.format("%Y-%m-%d").to_string(),
                geometry.right_edge_mm(),
                Align::Right,
            ),
        ],
    }
}

/// Write the footer of every page in `range`, replacing whatever was there
pub fn stamp_page_numbers(canvas: &mut Canvas, ctx: &RenderContext<'_>, range: Range<usize>) -> Result<()> {
    let restore = canvas.active_page();
    for index in range {
        canvas.set_active_page(index)?;
        canvas.set_footer(footer_for(ctx, index))?;
    }
    if restore < canvas.page_count() {
        canvas.set_active_page(restore)?;
    }
    Ok(())
}
