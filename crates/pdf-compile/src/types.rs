use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Invalid configuration ({setting}): {message}")]
    Configuration {
        setting: &'static str,
        message: String,
    },
    #[error("Failed to decode capture {index} (\"{title}\"): {source}")]
    CaptureDecode {
        index: usize,
        title: String,
        #[source]
        source: image::ImageError,
    },
    #[error("No pages to compile")]
    EmptyProject,
    #[error("No project selected")]
    NoActiveProject,
    #[error("Project not found: {0}")]
    ProjectNotFound(String),
    #[error("Page not found at position {0}")]
    PageNotFound(usize),
    #[error("Invalid export file: {0}")]
    InvalidExport(String),
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl CompileError {
    pub(crate) fn config(setting: &'static str, message: impl Into<String>) -> Self {
        CompileError::Configuration {
            setting,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CompileError>;

/// Named output paper sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperSize {
    #[default]
    A4,
    Letter,
    Legal,
}

impl PaperSize {
    /// Portrait dimensions (width, height) in millimeters
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PaperSize::A4 => (210.0, 297.0),
            PaperSize::Letter => (215.9, 279.4),
            PaperSize::Legal => (215.9, 355.6),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PaperSize::A4 => "A4 (210x297mm)",
            PaperSize::Letter => "Letter (8.5x11in)",
            PaperSize::Legal => "Legal (8.5x14in)",
        }
    }

    /// Look up a paper size by its settings key, falling back to A4
    pub fn from_key(key: &str) -> Self {
        match key.to_ascii_lowercase().as_str() {
            "letter" => PaperSize::Letter,
            "legal" => PaperSize::Legal,
            _ => PaperSize::A4,
        }
    }
}

impl<'de> Deserialize<'de> for PaperSize {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let key = String::deserialize(deserializer)?;
        Ok(PaperSize::from_key(&key))
    }
}

/// How a capture was taken by the capture provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    /// Only the visible viewport
    #[default]
    Visible,
    /// The full scrollable extent
    #[serde(rename = "fullpage", alias = "full")]
    FullPage,
}
