//! Vertical segmentation of captures taller than a page
//!
//! A capture is drawn at the full content width. When its drawn height does
//! not fit in the space left on its first page, it is cut into slices: the
//! first slice fills the remainder of the first page, every following slice
//! fills a whole page and starts `overlap` source pixels above the end of the
//! previous one so that a line of content cut at a page boundary is repeated
//! at the top of the next page.

use super::Geometry;
use crate::types::{CompileError, Result};

/// One vertical slice of a source image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// First source row of the slice
    pub src_y: u32,
    /// Number of source rows in the slice
    pub src_height: u32,
    /// Height of the slice when drawn at the content width
    pub draw_height_mm: f32,
}

impl Segment {
    /// One past the last source row
    pub fn src_end(&self) -> u32 {
        self.src_y + self.src_height
    }
}

/// Pixel-space parameters of a segmentation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceBudget {
    /// Source rows that fit on the first page
    pub first_px: u32,
    /// Source rows that fit on a full continuation page
    pub full_px: u32,
    /// Source rows repeated at the top of each continuation page
    pub overlap_px: u32,
}

impl SliceBudget {
    /// Convert the millimeter budget into source pixels for an image of the given width.
    ///
    /// Rows are rounded down so a slice never draws taller than its space.
    pub fn for_image(width_px: u32, available_mm: f32, geometry: &Geometry) -> Self {
        let px_per_mm = width_px as f32 / geometry.content_width_mm;
        Self {
            first_px: (available_mm * px_per_mm).floor().max(1.0) as u32,
            full_px: (geometry.drawable_height_mm * px_per_mm).floor().max(1.0) as u32,
            overlap_px: (geometry.overlap_mm * px_per_mm).round().max(0.0) as u32,
        }
    }
}

/// Split an image into page slices.
///
/// `available_mm` is the image height left on the capture's first page.
/// Returns a single slice covering the whole image when it fits there.
pub fn segment_image(
    width_px: u32,
    height_px: u32,
    available_mm: f32,
    geometry: &Geometry,
) -> Result<Vec<Segment>> {
    if width_px == 0 || height_px == 0 {
        return Err(CompileError::config(
            "imageData",
            format!("capture has empty dimensions {}x{}", width_px, height_px),
        ));
    }

    let px_per_mm = width_px as f32 / geometry.content_width_mm;
    let natural_height_mm = height_px as f32 / px_per_mm;

    if natural_height_mm <= available_mm {
        return Ok(vec![Segment {
            src_y: 0,
            src_height: height_px,
            draw_height_mm: natural_height_mm,
        }]);
    }

    let budget = SliceBudget::for_image(width_px, available_mm, geometry);
    split_rows(height_px, budget, px_per_mm)
}

/// Slice `height_px` source rows according to a pixel budget
pub fn split_rows(height_px: u32, budget: SliceBudget, px_per_mm: f32) -> Result<Vec<Segment>> {
    if budget.first_px == 0 {
        return Err(CompileError::config(
            "margins",
            "no room for image content on the first page of a capture",
        ));
    }
    if budget.overlap_px >= budget.full_px {
        return Err(CompileError::config(
            "overlapPx",
            format!(
                "overlap of {} px is not smaller than a full page of {} px",
                budget.overlap_px, budget.full_px
            ),
        ));
    }

    let first_height = budget.first_px.min(height_px);
    let mut segments = vec![Segment {
        src_y: 0,
        src_height: first_height,
        draw_height_mm: first_height as f32 / px_per_mm,
    }];

    let mut end = first_height;
    while end < height_px {
        let src_y = end - budget.overlap_px.min(end);
        let src_height = budget.full_px.min(height_px - src_y);
        segments.push(Segment {
            src_y,
            src_height,
            draw_height_mm: src_height as f32 / px_per_mm,
        });
        end = src_y + src_height;
    }

    Ok(segments)
}
