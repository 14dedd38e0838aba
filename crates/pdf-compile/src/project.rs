//! Projects and their captured pages

use crate::types::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What the capture provider hands over for one screenshot
#[derive(Debug, Clone)]
pub struct RawCapture {
    /// Encoded image (PNG, JPEG or WebP)
    pub image_bytes: Vec<u8>,
    pub captured_at: DateTime<Utc>,
    pub title: String,
    pub url: String,
}

/// One stored screenshot plus its metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageCapture {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_title: Option<String>,
    pub url: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub captured_at: DateTime<Utc>,
    #[serde(with = "data_url")]
    pub image_data: Vec<u8>,
    #[serde(default, with = "data_url::optional", skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<Vec<u8>>,
    /// Pixel width of the original capture
    pub width: u32,
    /// Pixel height of the original capture
    pub height: u32,
    #[serde(default)]
    pub capture_mode: CaptureMode,
}

impl PageCapture {
    /// Title shown in headers and the table of contents
    pub fn display_title(&self) -> &str {
        match &self.custom_title {
            Some(title) if !title.trim().is_empty() => title,
            _ => &self.title,
        }
    }
}

/// An ordered collection of captures; page order is document order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub pages: Vec<PageCapture>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            created: Utc::now(),
            pages: Vec::new(),
        }
    }

    /// Deep copy with a fresh project id and fresh page ids
    pub fn with_fresh_ids(&self) -> Self {
        let mut copy = self.clone();
        copy.id = new_id();
        for page in &mut copy.pages {
            page.id = new_id();
        }
        copy
    }

    pub fn page_mut(&mut self, index: usize) -> Result<&mut PageCapture> {
        self.pages
            .get_mut(index)
            .ok_or(CompileError::PageNotFound(index))
    }

    /// Move the page at `from` so that it ends up at position `to`
    pub fn move_page(&mut self, from: usize, to: usize) -> Result<()> {
        if from >= self.pages.len() {
            return Err(CompileError::PageNotFound(from));
        }
        if to >= self.pages.len() {
            return Err(CompileError::PageNotFound(to));
        }
        let page = self.pages.remove(from);
        self.pages.insert(to, page);
        Ok(())
    }

    pub fn remove_page(&mut self, index: usize) -> Result<PageCapture> {
        if index >= self.pages.len() {
            return Err(CompileError::PageNotFound(index));
        }
        Ok(self.pages.remove(index))
    }
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Image bytes carried as `data:<mime>;base64,...` strings
pub(crate) mod data_url {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn encode(bytes: &[u8]) -> String {
        let mime = image::guess_format(bytes)
            .map(|format| format.to_mime_type())
            .unwrap_or("application/octet-stream");
        format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
    }

    pub fn decode(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
        let payload = match text.split_once(";base64,") {
            Some((_, payload)) => payload,
            None => text,
        };
        STANDARD.decode(payload.trim())
    }

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        decode(&text).map_err(serde::de::Error::custom)
    }

    pub mod optional {
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(bytes: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match bytes {
                Some(bytes) => super::serialize(bytes, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let text = Option::<String>::deserialize(deserializer)?;
            text.map(|text| super::decode(&text).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}
