//! Shared constants for document compilation
//!
//! Layout measurements, font sizes and colours used by the planner and the
//! renderer. All lengths are millimeters unless the name says otherwise.

// =============================================================================
// Unit Conversion
// =============================================================================

/// Millimeters per CSS pixel (96 px per inch)
pub const MM_PER_PX: f32 = 0.264583;

/// Points per millimeter (1 inch = 72 points, 1 inch = 25.4mm)
pub const POINTS_PER_MM: f32 = 72.0 / 25.4;

/// Convert millimeters to points
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

/// Convert CSS pixels to millimeters
#[inline]
pub fn px_to_mm(px: f32) -> f32 {
    px * MM_PER_PX
}

// =============================================================================
// Content Pages
// =============================================================================

/// Space above the header title line
pub const HEADER_LEAD_MM: f32 = 1.0;

/// Height consumed by the header band (title, URL line, underline)
pub const HEADER_RESERVE_MM: f32 = 14.0;

/// Height reserved at the bottom of every page for the footer line
pub const FOOTER_RESERVE_MM: f32 = 8.0;

/// Cursor advance after a section divider rule
pub const DIVIDER_ADVANCE_MM: f32 = 2.0;

/// Footer baseline, measured up from the bottom page edge minus the margin
pub const FOOTER_BASELINE_OFFSET_MM: f32 = 4.0;

pub const HEADER_TITLE_CHARS: usize = 75;
pub const HEADER_URL_CHARS: usize = 95;

// =============================================================================
// Table of Contents
// =============================================================================

/// Height of one TOC row
pub const TOC_ITEM_HEIGHT_MM: f32 = 14.0;

/// Height of the title block on the first TOC page
pub const TOC_HEADER_HEIGHT_MM: f32 = 40.0;

pub const TOC_TITLE_CHARS: usize = 65;
pub const TOC_URL_CHARS: usize = 90;

// =============================================================================
// Fonts (points)
// =============================================================================

pub const FOOTER_FONT_SIZE: f32 = 7.0;
pub const HEADER_TITLE_FONT_SIZE: f32 = 10.0;
pub const HEADER_META_FONT_SIZE: f32 = 7.0;
pub const TOC_TITLE_FONT_SIZE: f32 = 22.0;
pub const TOC_SUBTITLE_FONT_SIZE: f32 = 10.0;
pub const TOC_ENTRY_FONT_SIZE: f32 = 10.0;
pub const TOC_PAGE_REF_FONT_SIZE: f32 = 9.0;
pub const TOC_META_FONT_SIZE: f32 = 7.0;
pub const COVER_TITLE_FONT_SIZE: f32 = 32.0;
pub const COVER_SUBTITLE_FONT_SIZE: f32 = 14.0;
pub const COVER_AUTHOR_FONT_SIZE: f32 = 16.0;
pub const COVER_DATE_FONT_SIZE: f32 = 12.0;
pub const COVER_CREDIT_FONT_SIZE: f32 = 8.0;
pub const WATERMARK_FONT_SIZE: f32 = 60.0;

// =============================================================================
// Watermark
// =============================================================================

pub const WATERMARK_OPACITY: f32 = 0.08;
pub const WATERMARK_ANGLE_DEG: f32 = 45.0;

// =============================================================================
// Product
// =============================================================================

/// Creator/author recorded in the document metadata
pub const PRODUCT_NAME: &str = "Web PDF Compiler";

/// Interchange format version written on export
pub const EXPORT_VERSION: &str = "2.9.0";

/// Width of generated page thumbnails (pixels)
pub const THUMBNAIL_WIDTH_PX: u32 = 120;

pub const THUMBNAIL_QUALITY: f32 = 0.6;
