//! Rendering of a finished layout plan
//!
//! This module handles all drawing:
//! - The recording canvas and its PDF serialization
//! - Content, table of contents and cover pages
//! - Footer stamping and the watermark pass

pub mod canvas;
mod content;
mod cover;
pub mod footer;
pub mod pdf;
pub mod text;
mod toc;
mod watermark;

pub use canvas::Canvas;
pub use footer::{footer_for, stamp_page_numbers};
pub use pdf::{DocumentInfo, document_bytes, write_document};

use crate::capture::decode_capture;
use crate::compile::{CompilePhase, CompileProgress};
use crate::layout::{Geometry, LayoutPlan, PageKind};
use crate::project::Project;
use crate::settings::CompileSettings;
use crate::types::*;
use chrono::{DateTime, Local, Utc};
use image::DynamicImage;

/// Everything a page builder reads while drawing
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub project: &'a Project,
    pub settings: &'a CompileSettings,
    pub geometry: &'a Geometry,
    pub plan: &'a LayoutPlan,
    pub generated_at: DateTime<Local>,
}

impl RenderContext<'_> {
    /// Capture timestamps are shown in local time
    pub fn format_capture_time(&self, captured_at: &DateTime<Utc>) -> String {
        captured_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
            .to_string()
    }
}

/// Draw every page of the plan.
///
/// All pages are allocated first. Content pages are drawn before the front
/// matter so progress moves forward. Each capture is decoded once, when its
/// first slice is reached, and dropped before the next capture is decoded.
pub fn render_plan(
    ctx: &RenderContext<'_>,
    progress: &mut dyn FnMut(CompileProgress),
) -> Result<Canvas> {
    let geometry = ctx.geometry;
    let mut canvas = Canvas::new(geometry.page_width_mm, geometry.page_height_mm);
    for _ in &ctx.plan.pages {
        canvas.add_page();
    }

    let capture_count = ctx.plan.captures.len();
    let mut decoded: Option<(usize, DynamicImage)> = None;
    for (page_index, kind) in ctx.plan.pages.iter().enumerate() {
        let &PageKind::Content { capture, segment } = kind else {
            continue;
        };
        if decoded.as_ref().map(|(index, _)| *index) != Some(capture) {
            decoded.take();
            progress(CompileProgress::new(CompilePhase::ProcessingCapture {
                index: capture,
                total: capture_count,
            }));
            decoded = Some((capture, decode_stored(ctx.project, capture)?));
        }
        if let Some((_, image)) = &decoded {
            canvas.set_active_page(page_index)?;
            content::draw_content_page(&mut canvas, ctx, capture, segment, image)?;
        }
    }
    drop(decoded);

    if ctx.plan.toc_page_count > 0 {
        progress(CompileProgress::new(CompilePhase::BuildingToc));
    }
    for (page_index, kind) in ctx.plan.pages.iter().enumerate() {
        match kind {
            PageKind::Cover => {
                canvas.set_active_page(page_index)?;
                cover::draw_cover(&mut canvas, ctx)?;
            }
            PageKind::Toc { toc_page, entries } => {
                canvas.set_active_page(page_index)?;
                toc::draw_toc_page(&mut canvas, ctx, *toc_page, entries.clone())?;
            }
            PageKind::Content { .. } => {}
        }
    }

    if ctx.settings.include_page_numbers {
        let total = canvas.page_count();
        stamp_page_numbers(&mut canvas, ctx, 0..total)?;
    }
    watermark::apply_watermark(&mut canvas, ctx)?;

    Ok(canvas)
}

fn decode_stored(project: &Project, index: usize) -> Result<DynamicImage> {
    let page = project
        .pages
        .get(index)
        .ok_or(CompileError::PageNotFound(index))?;
    decode_capture(&page.image_data).map_err(|source| CompileError::CaptureDecode {
        index,
        title: page.display_title().to_string(),
        source,
    })
}
