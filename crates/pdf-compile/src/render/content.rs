//! Content pages: capture header band and image slices

use super::RenderContext;
use super::canvas::{Align, Canvas, LinkRegion, LinkTarget, Rgb, TextRun};
use super::text::truncate;
use crate::capture::encode_segment;
use crate::constants::*;
use crate::project::PageCapture;
use crate::types::*;
use image::DynamicImage;

const DIVIDER_COLOR: Rgb = Rgb(180, 180, 210);
const DIVIDER_WIDTH_MM: f32 = 0.4;
const TITLE_COLOR: Rgb = Rgb(50, 50, 70);
const META_COLOR: Rgb = Rgb(120, 120, 140);
const UNDERLINE_COLOR: Rgb = Rgb(210, 210, 225);
const UNDERLINE_WIDTH_MM: f32 = 0.15;

/// Draw one slice of a capture on the active page.
///
/// The first slice of a capture gets the divider and header band above it;
/// continuation slices start at the top margin.
pub(crate) fn draw_content_page(
    canvas: &mut Canvas,
    ctx: &RenderContext<'_>,
    capture_index: usize,
    segment_index: usize,
    decoded: &DynamicImage,
) -> Result<()> {
    let page = ctx
        .project
        .pages
        .get(capture_index)
        .ok_or(CompileError::PageNotFound(capture_index))?;
    let layout = ctx
        .plan
        .captures
        .get(capture_index)
        .ok_or(CompileError::PageNotFound(capture_index))?;
    let segment = layout
        .segments
        .get(segment_index)
        .ok_or(CompileError::PageNotFound(segment_index))?;
    let geometry = ctx.geometry;

    let image_top = if segment_index == 0 {
        draw_capture_header(canvas, ctx, capture_index, page)?;
        layout.image_top_mm
    } else {
        geometry.margin_mm
    };

    let image = encode_segment(&page.image_data, decoded, segment, ctx.settings.pdf_image_quality)?;
    canvas.draw_image(
        image,
        geometry.margin_mm,
        image_top,
        geometry.content_width_mm,
        segment.draw_height_mm,
    )
}

fn draw_capture_header(
    canvas: &mut Canvas,
    ctx: &RenderContext<'_>,
    capture_index: usize,
    page: &PageCapture,
) -> Result<()> {
    let geometry = ctx.geometry;
    let left = geometry.margin_mm;
    let right = geometry.right_edge_mm();
    let mut cursor = geometry.margin_mm;

    if ctx.settings.page_break_separator && capture_index > 0 {
        canvas.draw_line((left, cursor), (right, cursor), DIVIDER_WIDTH_MM, DIVIDER_COLOR)?;
        cursor += DIVIDER_ADVANCE_MM;
    }

    if !ctx.settings.include_headers {
        return Ok(());
    }

    cursor += HEADER_LEAD_MM;
    canvas.draw_text(
        TextRun::new(
            format!(
                "{}. {}",
                capture_index + 1,
                truncate(page.display_title(), HEADER_TITLE_CHARS)
            ),
            left,
            cursor + 3.0,
        )
        .size(HEADER_TITLE_FONT_SIZE)
        .bold()
        .color(TITLE_COLOR),
    )?;

    let url = TextRun::new(truncate(&page.url, HEADER_URL_CHARS), left, cursor + 7.5)
        .size(HEADER_META_FONT_SIZE)
        .color(META_COLOR);
    if !page.url.is_empty() {
        canvas.register_link(LinkRegion {
            x_mm: left,
            y_mm: cursor + 4.5,
            width_mm: url.width_mm(),
            height_mm: 4.0,
            target: LinkTarget::Uri(page.url.clone()),
        })?;
    }
    canvas.draw_text(url)?;

    canvas.draw_text(
        TextRun::new(ctx.format_capture_time(&page.captured_at), right, cursor + 7.5)
            .size(HEADER_META_FONT_SIZE)
            .color(META_COLOR)
            .align(Align::Right),
    )?;

    canvas.draw_line(
        (left, cursor + 9.5),
        (right, cursor + 9.5),
        UNDERLINE_WIDTH_MM,
        UNDERLINE_COLOR,
    )
}
