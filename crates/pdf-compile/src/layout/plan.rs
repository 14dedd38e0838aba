//! Layout planning
//!
//! The whole document is laid out before anything is drawn. Content pages are
//! planned first with content-relative page numbers, then the front matter
//! (cover, table of contents) is sized and every TOC entry is shifted exactly
//! once by the number of front matter pages. Rendering walks the finished plan.

use super::{Geometry, Segment, TocCapacity, segment_image};
use crate::capture::image_dimensions;
use crate::project::Project;
use crate::settings::CompileSettings;
use crate::types::*;
use chrono::{DateTime, Utc};
use std::ops::Range;

/// One table of contents row
#[derive(Debug, Clone, PartialEq)]
pub struct TocEntry {
    pub title: String,
    pub url: String,
    pub captured_at: DateTime<Utc>,
    /// 1-based page holding the first slice of the capture
    pub pdf_page: usize,
}

/// What an output page holds
#[derive(Debug, Clone, PartialEq)]
pub enum PageKind {
    Cover,
    Toc {
        /// 0-based index among the TOC pages
        toc_page: usize,
        entries: Range<usize>,
    },
    Content {
        capture: usize,
        segment: usize,
    },
}

/// Where one capture lands on the content pages
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureLayout {
    pub width_px: u32,
    pub height_px: u32,
    /// Top of the image on the capture's first page, from the top edge
    pub image_top_mm: f32,
    pub segments: Vec<Segment>,
}

impl CaptureLayout {
    pub fn page_count(&self) -> usize {
        self.segments.len()
    }
}

/// Content pages only, numbered from 1 without any front matter
#[derive(Debug, Clone, PartialEq)]
pub struct ContentLayout {
    pub captures: Vec<CaptureLayout>,
    pub toc_entries: Vec<TocEntry>,
    pub page_count: usize,
}

impl ContentLayout {
    /// Plan the content pages of a project.
    ///
    /// Only image headers are read here; pixels are decoded during rendering.
    pub fn build(project: &Project, geometry: &Geometry) -> Result<Self> {
        let mut captures = Vec::with_capacity(project.pages.len());
        let mut toc_entries = Vec::with_capacity(project.pages.len());
        let mut page_count = 0;

        for (index, page) in project.pages.iter().enumerate() {
            let (width_px, height_px) =
                image_dimensions(&page.image_data).map_err(|source| CompileError::CaptureDecode {
                    index,
                    title: page.display_title().to_string(),
                    source,
                })?;

            let layout = Self::layout_capture(index, width_px, height_px, geometry)?;
            log::debug!(
                "Capture {} ({}x{}) spans {} page(s)",
                index + 1,
                width_px,
                height_px,
                layout.page_count()
            );

            toc_entries.push(TocEntry {
                title: page.display_title().to_string(),
                url: page.url.clone(),
                captured_at: page.captured_at,
                pdf_page: page_count + 1,
            });
            page_count += layout.page_count();
            captures.push(layout);
        }

        Ok(Self {
            captures,
            toc_entries,
            page_count,
        })
    }

    /// Plan a single capture starting on a fresh page
    pub fn layout_capture(
        index: usize,
        width_px: u32,
        height_px: u32,
        geometry: &Geometry,
    ) -> Result<CaptureLayout> {
        let segments = segment_image(
            width_px,
            height_px,
            geometry.first_page_available_mm(index),
            geometry,
        )?;
        Ok(CaptureLayout {
            width_px,
            height_px,
            image_top_mm: geometry.margin_mm + geometry.lead_in_mm(index),
            segments,
        })
    }
}

/// The finished, immutable page sequence of a compile run
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPlan {
    pub pages: Vec<PageKind>,
    pub captures: Vec<CaptureLayout>,
    /// Entries with final 1-based page numbers
    pub toc_entries: Vec<TocEntry>,
    pub toc_page_count: usize,
    pub has_cover: bool,
}

impl LayoutPlan {
    pub fn build(
        content: ContentLayout,
        settings: &CompileSettings,
        geometry: &Geometry,
    ) -> Result<Self> {
        let has_cover = settings.include_cover_page;
        let toc_ranges = if settings.include_toc {
            TocCapacity::for_geometry(geometry)?.page_ranges(content.toc_entries.len())
        } else {
            Vec::new()
        };
        let toc_page_count = toc_ranges.len();
        let front_matter = toc_page_count + usize::from(has_cover);

        let mut toc_entries = content.toc_entries;
        for entry in &mut toc_entries {
            entry.pdf_page += front_matter;
        }

        let mut pages = Vec::with_capacity(front_matter + content.page_count);
        if has_cover {
            pages.push(PageKind::Cover);
        }
        for (toc_page, entries) in toc_ranges.into_iter().enumerate() {
            pages.push(PageKind::Toc { toc_page, entries });
        }
        for (capture, layout) in content.captures.iter().enumerate() {
            for segment in 0..layout.segments.len() {
                pages.push(PageKind::Content { capture, segment });
            }
        }

        Ok(Self {
            pages,
            captures: content.captures,
            toc_entries,
            toc_page_count,
            has_cover,
        })
    }

    /// Plan a whole project: content first, then front matter
    pub fn for_project(
        project: &Project,
        settings: &CompileSettings,
        geometry: &Geometry,
    ) -> Result<Self> {
        let content = ContentLayout::build(project, geometry)?;
        Self::build(content, settings, geometry)
    }

    pub fn total_pages(&self) -> usize {
        self.pages.len()
    }

    /// Pages placed ahead of the content pages
    pub fn front_matter_pages(&self) -> usize {
        self.toc_page_count + usize::from(self.has_cover)
    }

    /// 0-based index of the first content page of a capture
    pub fn first_page_of(&self, capture: usize) -> Option<usize> {
        self.pages
            .iter()
            .position(|kind| matches!(kind, PageKind::Content { capture: c, segment: 0 } if *c == capture))
    }

    /// 0-based index of the first page that may carry a watermark
    pub fn watermark_start(&self) -> usize {
        usize::from(self.has_cover)
    }
}
