//! Table of contents pages

use super::RenderContext;
use super::canvas::{Align, Canvas, LinkRegion, LinkTarget, Rgb, TextRun};
use super::text::truncate;
use crate::constants::*;
use crate::types::*;
use std::ops::Range;

const HEADING_COLOR: Rgb = Rgb(50, 50, 70);
const SUBTITLE_COLOR: Rgb = Rgb(120, 120, 140);
const ACCENT_COLOR: Rgb = Rgb(180, 160, 220);
const PAGE_REF_COLOR: Rgb = Rgb(160, 130, 200);
const META_COLOR: Rgb = Rgb(140, 140, 155);
const SEPARATOR_COLOR: Rgb = Rgb(230, 230, 240);

/// Draw the TOC rows `entries` on the active page
pub(crate) fn draw_toc_page(
    canvas: &mut Canvas,
    ctx: &RenderContext<'_>,
    toc_page: usize,
    entries: Range<usize>,
) -> Result<()> {
    let geometry = ctx.geometry;
    let left = geometry.margin_mm;
    let right = geometry.right_edge_mm();
    let center = geometry.center_x_mm();
    let mut y = geometry.margin_mm;

    if toc_page == 0 {
        canvas.draw_text(
            TextRun::new(ctx.project.name.as_str(), center, y + 12.0)
                .size(TOC_TITLE_FONT_SIZE)
                .bold()
                .color(HEADING_COLOR)
                .align(Align::Center),
        )?;
        canvas.draw_text(
            TextRun::new(
                format!("Compiled on {}", ctx.generated_at.format("%Y-%m-%d %H:%M:%S")),
                center,
                y + 20.0,
            )
            .size(TOC_SUBTITLE_FONT_SIZE)
            .color(SUBTITLE_COLOR)
            .align(Align::Center),
        )?;
        canvas.draw_text(
            TextRun::new(
                format!("{} page(s) captured", ctx.project.pages.len()),
                center,
                y + 27.0,
            )
            .size(TOC_SUBTITLE_FONT_SIZE)
            .color(SUBTITLE_COLOR)
            .align(Align::Center),
        )?;
        canvas.draw_line((left + 20.0, y + 32.0), (right - 20.0, y + 32.0), 0.5, ACCENT_COLOR)?;
        y += TOC_HEADER_HEIGHT_MM;
    }

    for index in entries {
        let entry = ctx
            .plan
            .toc_entries
            .get(index)
            .ok_or(CompileError::PageNotFound(index))?;

        canvas.draw_text(
            TextRun::new(
                format!("{}.  {}", index + 1, truncate(&entry.title, TOC_TITLE_CHARS)),
                left,
                y + 4.0,
            )
            .size(TOC_ENTRY_FONT_SIZE)
            .bold()
            .color(HEADING_COLOR),
        )?;
        canvas.draw_text(
            TextRun::new(format!("p.{}", entry.pdf_page), right, y + 4.0)
                .size(TOC_PAGE_REF_FONT_SIZE)
                .bold()
                .color(PAGE_REF_COLOR)
                .align(Align::Right),
        )?;

        let url = TextRun::new(truncate(&entry.url, TOC_URL_CHARS), left + 5.0, y + 9.0)
            .size(TOC_META_FONT_SIZE)
            .color(META_COLOR);
        if !entry.url.is_empty() {
            canvas.register_link(LinkRegion {
                x_mm: left + 5.0,
                y_mm: y + 6.0,
                width_mm: url.width_mm(),
                height_mm: 4.0,
                target: LinkTarget::Uri(entry.url.clone()),
            })?;
        }
        canvas.draw_text(url)?;
        canvas.draw_text(
            TextRun::new(ctx.format_capture_time(&entry.captured_at), right, y + 9.0)
                .size(TOC_META_FONT_SIZE)
                .color(META_COLOR)
                .align(Align::Right),
        )?;

        canvas.draw_line((left, y + 12.0), (right, y + 12.0), 0.1, SEPARATOR_COLOR)?;

        // Whole row jumps to the capture
        canvas.register_link(LinkRegion {
            x_mm: left,
            y_mm: y,
            width_mm: geometry.content_width_mm,
            height_mm: TOC_ITEM_HEIGHT_MM,
            target: LinkTarget::Page(entry.pdf_page.saturating_sub(1)),
        })?;

        y += TOC_ITEM_HEIGHT_MM;
    }

    Ok(())
}
