use crate::layout::Geometry;
use crate::types::*;
use serde::{Deserialize, Serialize};

/// Compile configuration
///
/// Serialized with the same keys the capture tool has always stored, so an
/// existing settings file loads unchanged. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompileSettings {
    pub paper_size: PaperSize,
    /// Page margin in CSS pixels
    #[serde(rename = "margins")]
    pub margin_px: f32,
    pub capture_scale: f32,
    /// JPEG quality for stored captures (0.5 - 1.0)
    pub image_quality: f32,
    /// JPEG quality for re-encoded page slices (0.5 - 1.0)
    pub pdf_image_quality: f32,
    /// Captures wider than this are downscaled on ingest
    pub compress_max_width: u32,
    pub include_headers: bool,
    pub include_page_numbers: bool,
    #[serde(rename = "includeTOC")]
    pub include_toc: bool,
    pub include_cover_page: bool,
    pub cover_author: String,
    pub watermark_text: String,
    /// Vertical overlap between consecutive slices, in CSS pixels
    pub overlap_px: f32,
    /// Draw a divider rule above every capture after the first
    pub page_break_separator: bool,
}

impl Default for CompileSettings {
    fn default() -> Self {
        Self {
            paper_size: PaperSize::A4,
            margin_px: 20.0,
            capture_scale: 2.0,
            image_quality: 0.92,
            pdf_image_quality: 0.92,
            compress_max_width: 2400,
            include_headers: true,
            include_page_numbers: true,
            include_toc: true,
            include_cover_page: false,
            cover_author: String::new(),
            watermark_text: String::new(),
            overlap_px: 30.0,
            page_break_separator: true,
        }
    }
}

impl CompileSettings {
    /// Load settings from a JSON file
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let settings: CompileSettings = serde_json::from_slice(&bytes)?;
        Ok(settings.clamped())
    }

    /// Save settings to a JSON file
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Bring every numeric field into its supported range
    pub fn clamped(mut self) -> Self {
        self.margin_px = clamp_field("margins", self.margin_px, 0.0, 80.0);
        self.overlap_px = clamp_field("overlapPx", self.overlap_px, 0.0, 100.0);
        self.capture_scale = clamp_field("captureScale", self.capture_scale, 1.0, 3.0);
        self.image_quality = clamp_field("imageQuality", self.image_quality, 0.5, 1.0);
        self.pdf_image_quality = clamp_field("pdfImageQuality", self.pdf_image_quality, 0.5, 1.0);
        self.compress_max_width =
            clamp_field("compressMaxWidth", self.compress_max_width as f32, 800.0, 4000.0) as u32;
        self.cover_author = self.cover_author.trim().to_string();
        self.watermark_text = self.watermark_text.trim().to_string();
        self
    }

    /// Reject settings that leave no room to lay out content
    pub fn validate(&self) -> Result<()> {
        if !self.margin_px.is_finite() || self.margin_px < 0.0 {
            return Err(CompileError::config("margins", "margin must be non-negative"));
        }
        if !self.overlap_px.is_finite() || self.overlap_px < 0.0 {
            return Err(CompileError::config(
                "overlapPx",
                "overlap must be non-negative",
            ));
        }
        Geometry::from_settings(self).map(|_| ())
    }

    pub fn has_watermark(&self) -> bool {
        !self.watermark_text.trim().is_empty()
    }
}

fn clamp_field(name: &str, value: f32, min: f32, max: f32) -> f32 {
    if value.is_nan() {
        log::warn!("Setting {} is not a number, using {}", name, min);
        return min;
    }
    let clamped = value.clamp(min, max);
    if clamped != value {
        log::warn!("Setting {} = {} clamped to {}", name, value, clamped);
    }
    clamped
}
