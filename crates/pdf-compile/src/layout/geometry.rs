//! Page geometry derived from compile settings

use crate::constants::*;
use crate::settings::CompileSettings;
use crate::types::{CompileError, Result};

/// Reusable page measurements for one compile run, in millimeters.
///
/// Computed once from the settings and never mutated. Vertical positions are
/// measured down from the top page edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub margin_mm: f32,
    pub content_width_mm: f32,
    /// Height between the top margin and the footer band
    pub drawable_height_mm: f32,
    /// Header band height including the lead above the title (0 when disabled)
    pub header_reserve_mm: f32,
    /// Footer band height (0 when page numbers are disabled)
    pub footer_reserve_mm: f32,
    /// Cursor advance after a divider rule (0 when dividers are disabled)
    pub divider_mm: f32,
    pub overlap_mm: f32,
}

impl Geometry {
    pub fn from_settings(settings: &CompileSettings) -> Result<Self> {
        let (page_width_mm, page_height_mm) = settings.paper_size.dimensions_mm();
        let margin_mm = px_to_mm(settings.margin_px);
        let header_reserve_mm = if settings.include_headers {
            HEADER_LEAD_MM + HEADER_RESERVE_MM
        } else {
            0.0
        };
        let footer_reserve_mm = if settings.include_page_numbers {
            FOOTER_RESERVE_MM
        } else {
            0.0
        };
        let divider_mm = if settings.page_break_separator {
            DIVIDER_ADVANCE_MM
        } else {
            0.0
        };

        let content_width_mm = page_width_mm - 2.0 * margin_mm;
        if content_width_mm <= 0.0 {
            return Err(CompileError::config(
                "margins",
                format!(
                    "margin of {} px leaves no content width on {}",
                    settings.margin_px,
                    settings.paper_size.label()
                ),
            ));
        }

        let drawable_height_mm = page_height_mm - 2.0 * margin_mm - footer_reserve_mm;
        if drawable_height_mm <= 0.0 {
            return Err(CompileError::config(
                "margins",
                format!(
                    "margin of {} px leaves no drawable height on {}",
                    settings.margin_px,
                    settings.paper_size.label()
                ),
            ));
        }

        // The first page of every capture after the first must still have room
        // for image content below the divider and header band.
        if drawable_height_mm - divider_mm - header_reserve_mm <= 0.0 {
            return Err(CompileError::config(
                "includeHeaders",
                "header band does not fit inside the drawable height",
            ));
        }

        let overlap_mm = px_to_mm(settings.overlap_px);
        if overlap_mm >= drawable_height_mm {
            return Err(CompileError::config(
                "overlapPx",
                format!(
                    "overlap of {} px is not smaller than the drawable page height",
                    settings.overlap_px
                ),
            ));
        }

        Ok(Self {
            page_width_mm,
            page_height_mm,
            margin_mm,
            content_width_mm,
            drawable_height_mm,
            header_reserve_mm,
            footer_reserve_mm,
            divider_mm,
            overlap_mm,
        })
    }

    /// Vertical space consumed above the image on a capture's first page
    pub fn lead_in_mm(&self, capture_index: usize) -> f32 {
        let divider = if capture_index > 0 {
            self.divider_mm
        } else {
            0.0
        };
        divider + self.header_reserve_mm
    }

    /// Image height available on a capture's first page
    pub fn first_page_available_mm(&self, capture_index: usize) -> f32 {
        self.drawable_height_mm - self.lead_in_mm(capture_index)
    }

    /// Baseline of the footer line, measured from the top edge
    pub fn footer_baseline_mm(&self) -> f32 {
        self.page_height_mm - self.margin_mm + FOOTER_BASELINE_OFFSET_MM
    }

    /// Right edge of the content area
    pub fn right_edge_mm(&self) -> f32 {
        self.page_width_mm - self.margin_mm
    }

    pub fn center_x_mm(&self) -> f32 {
        self.page_width_mm / 2.0
    }
}
