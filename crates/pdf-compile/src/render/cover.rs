//! Cover page

use super::RenderContext;
use super::canvas::{Align, Canvas, Rgb, TextRun};
use super::text::{FontWeight, wrap_text};
use crate::constants::*;
use crate::types::*;

const ACCENT_COLOR: Rgb = Rgb(180, 160, 220);
const TITLE_COLOR: Rgb = Rgb(50, 50, 70);
const SUBTITLE_COLOR: Rgb = Rgb(120, 120, 140);
const AUTHOR_COLOR: Rgb = Rgb(80, 80, 100);
const DATE_COLOR: Rgb = Rgb(140, 140, 155);
const CREDIT_COLOR: Rgb = Rgb(170, 170, 185);
const RULE_WIDTH_MM: f32 = 0.8;

/// Line spacing for wrapped titles, as a multiple of the font size
const LINE_HEIGHT_FACTOR: f32 = 1.15;

pub(crate) fn draw_cover(canvas: &mut Canvas, ctx: &RenderContext<'_>) -> Result<()> {
    let geometry = ctx.geometry;
    let height = geometry.page_height_mm;
    let center = geometry.center_x_mm();
    let rule_left = geometry.margin_mm + 10.0;
    let rule_right = geometry.right_edge_mm() - 10.0;

    let top_rule = geometry.margin_mm + 30.0;
    canvas.draw_line((rule_left, top_rule), (rule_right, top_rule), RULE_WIDTH_MM, ACCENT_COLOR)?;

    let title_top = height * 0.35;
    let lines = wrap_text(
        &ctx.project.name,
        COVER_TITLE_FONT_SIZE,
        FontWeight::Bold,
        geometry.content_width_mm - 20.0,
    );
    let line_height = COVER_TITLE_FONT_SIZE * LINE_HEIGHT_FACTOR / mm_to_pt(1.0);
    for (i, line) in lines.iter().enumerate() {
        canvas.draw_text(
            TextRun::new(line.as_str(), center, title_top + i as f32 * line_height)
                .size(COVER_TITLE_FONT_SIZE)
                .bold()
                .color(TITLE_COLOR)
                .align(Align::Center),
        )?;
    }

    let captures = ctx.project.pages.len();
    canvas.draw_text(
        TextRun::new(
            format!(
                "{} Captured Page{}",
                captures,
                if captures == 1 { "" } else { "s" }
            ),
            center,
            title_top + lines.len() as f32 * 14.0 + 8.0,
        )
        .size(COVER_SUBTITLE_FONT_SIZE)
        .color(SUBTITLE_COLOR)
        .align(Align::Center),
    )?;

    if !ctx.settings.cover_author.is_empty() {
        canvas.draw_text(
            TextRun::new(ctx.settings.cover_author.as_str(), center, height * 0.55)
                .size(COVER_AUTHOR_FONT_SIZE)
                .bold()
                .color(AUTHOR_COLOR)
                .align(Align::Center),
        )?;
    }

    canvas.draw_text(
        TextRun::new(ctx.generated_at.format("%B %-d, %Y").to_string(), center, height * 0.62)
            .size(COVER_DATE_FONT_SIZE)
            .color(DATE_COLOR)
            .align(Align::Center),
    )?;

    let bottom_rule = height - geometry.margin_mm - 20.0;
    canvas.draw_line(
        (rule_left, bottom_rule),
        (rule_right, bottom_rule),
        RULE_WIDTH_MM,
        ACCENT_COLOR,
    )?;

    canvas.draw_text(
        TextRun::new(
            format!("Generated by {}", PRODUCT_NAME),
            center,
            height - geometry.margin_mm - 10.0,
        )
        .size(COVER_CREDIT_FONT_SIZE)
        .color(CREDIT_COLOR)
        .align(Align::Center),
    )
}
