//! Capture ingest and image slicing
//!
//! Encoding and decoding is delegated to the `image` crate; this module only
//! decides sizes and qualities.

use crate::constants::{THUMBNAIL_QUALITY, THUMBNAIL_WIDTH_PX};
use crate::layout::Segment;
use crate::project::{PageCapture, RawCapture, new_id};
use crate::settings::CompileSettings;
use crate::types::*;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;

/// A JPEG ready to be embedded in the output document
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedImage {
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl PageCapture {
    /// Build a stored capture from provider output.
    ///
    /// Captures wider than `compress_max_width` are downscaled and re-encoded
    /// as JPEG at `image_quality`; narrower ones keep their original bytes.
    pub fn ingest(raw: RawCapture, mode: CaptureMode, settings: &CompileSettings) -> Result<Self> {
        let decoded = image::load_from_memory(&raw.image_bytes)?;
        let (width, height) = (decoded.width(), decoded.height());

        let thumbnail_height =
            ((height as f32 / width as f32) * THUMBNAIL_WIDTH_PX as f32).round().max(1.0) as u32;
        let thumbnail = decoded.resize_exact(THUMBNAIL_WIDTH_PX, thumbnail_height, FilterType::Triangle);
        let thumbnail = encode_jpeg(&thumbnail, THUMBNAIL_QUALITY)?;

        let image_data = if width > settings.compress_max_width {
            let ratio = settings.compress_max_width as f32 / width as f32;
            let scaled_height = (height as f32 * ratio).round().max(1.0) as u32;
            log::debug!(
                "Compressing capture {}x{} to {}x{}",
                width,
                height,
                settings.compress_max_width,
                scaled_height
            );
            let scaled =
                decoded.resize_exact(settings.compress_max_width, scaled_height, FilterType::Lanczos3);
            encode_jpeg(&scaled, settings.image_quality)?
        } else {
            raw.image_bytes
        };

        Ok(PageCapture {
            id: new_id(),
            title: raw.title,
            custom_title: None,
            url: raw.url,
            captured_at: raw.captured_at,
            image_data,
            thumbnail: Some(thumbnail),
            width,
            height,
            capture_mode: mode,
        })
    }
}

/// Read pixel dimensions from the image header without decoding pixels
pub fn image_dimensions(bytes: &[u8]) -> image::ImageResult<(u32, u32)> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_dimensions()
}

/// Fully decode a stored capture
pub fn decode_capture(bytes: &[u8]) -> image::ImageResult<DynamicImage> {
    image::load_from_memory(bytes)
}

/// Encode an image as baseline RGB JPEG; `quality` is in 0.0..=1.0
pub fn encode_jpeg(image: &DynamicImage, quality: f32) -> Result<Vec<u8>> {
    let rgb = image.to_rgb8();
    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, jpeg_quality(quality));
    rgb.write_with_encoder(encoder)?;
    Ok(bytes)
}

fn jpeg_quality(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Produce the embeddable image for one segment of a decoded capture.
///
/// A whole-image segment of a three-component JPEG reuses the stored bytes.
/// CMYK and grayscale JPEGs are re-encoded so they match `/DeviceRGB`.
pub fn encode_segment(
    source_bytes: &[u8],
    decoded: &DynamicImage,
    segment: &Segment,
    quality: f32,
) -> Result<EncodedImage> {
    let whole = segment.src_y == 0 && segment.src_height == decoded.height();
    if whole
        && decoded.color() == ColorType::Rgb8
        && image::guess_format(source_bytes).ok() == Some(ImageFormat::Jpeg)
        && jpeg_components(source_bytes) == Some(3)
    {
        return Ok(EncodedImage {
            jpeg: source_bytes.to_vec(),
            width: decoded.width(),
            height: decoded.height(),
        });
    }

    if whole {
        return Ok(EncodedImage {
            jpeg: encode_jpeg(decoded, quality)?,
            width: decoded.width(),
            height: decoded.height(),
        });
    }

    let slice = decoded.crop_imm(0, segment.src_y, decoded.width(), segment.src_height);
    Ok(EncodedImage {
        jpeg: encode_jpeg(&slice, quality)?,
        width: slice.width(),
        height: slice.height(),
    })
}

/// Component count from the first SOF marker of a JPEG stream
fn jpeg_components(bytes: &[u8]) -> Option<u8> {
    if !bytes.starts_with(&[0xFF, 0xD8]) {
        return None;
    }
    let mut pos = 2;
    while pos + 4 <= bytes.len() {
        if bytes[pos] != 0xFF {
            return None;
        }
        let marker = bytes[pos + 1];
        match marker {
            // Fill bytes before a marker
            0xFF => {
                pos += 1;
                continue;
            }
            // Standalone markers carry no length
            0x01 | 0xD0..=0xD7 => {
                pos += 2;
                continue;
            }
            0xD9 | 0xDA => return None,
            _ => {}
        }
        let length = u16::from_be_bytes([bytes[pos + 2], bytes[pos + 3]]) as usize;
        let is_sof = matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_sof {
            // length(2) precision(1) height(2) width(2) components(1)
            return bytes.get(pos + 9).copied();
        }
        pos += 2 + length;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb_jpeg() -> (DynamicImage, Vec<u8>) {
        let image = DynamicImage::ImageRgb8(image::RgbImage::from_fn(16, 8, |x, y| {
            image::Rgb([(x * 16) as u8, (y * 32) as u8, 90])
        }));
        let bytes = encode_jpeg(&image, 0.9).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        (decoded, bytes)
    }

    fn sof_offset(bytes: &[u8]) -> usize {
        bytes
            .windows(2)
            .position(|w| w[0] == 0xFF && matches!(w[1], 0xC0 | 0xC2))
            .unwrap()
    }

    fn whole(decoded: &DynamicImage) -> Segment {
        Segment {
            src_y: 0,
            src_height: decoded.height(),
            draw_height_mm: 10.0,
        }
    }

    #[test]
    fn test_jpeg_components() {
        let (_, bytes) = rgb_jpeg();
        assert_eq!(jpeg_components(&bytes), Some(3));

        let cmyk_header = [
            0xFF, 0xD8, 0xFF, 0xEE, 0x00, 0x04, 0x41, 0x64, 0xFF, 0xC0, 0x00, 0x14, 0x08, 0x00,
            0x10, 0x00, 0x10, 0x04,
        ];
        assert_eq!(jpeg_components(&cmyk_header), Some(4));
        assert_eq!(jpeg_components(b"not a jpeg"), None);
    }

    #[test]
    fn test_whole_rgb_jpeg_is_reused() {
        let (decoded, bytes) = rgb_jpeg();
        let encoded = encode_segment(&bytes, &decoded, &whole(&decoded), 0.9).unwrap();
        assert_eq!(encoded.jpeg, bytes);
    }

    #[test]
    fn test_four_component_jpeg_is_reencoded() {
        let (decoded, mut bytes) = rgb_jpeg();
        // Claim four components in the frame header; decoding is not repeated
        let components = sof_offset(&bytes) + 9;
        bytes[components] = 4;
        assert_eq!(jpeg_components(&bytes), Some(4));

        let encoded = encode_segment(&bytes, &decoded, &whole(&decoded), 0.9).unwrap();
        assert_ne!(encoded.jpeg, bytes);
        assert_eq!(jpeg_components(&encoded.jpeg), Some(3));
        assert_eq!((encoded.width, encoded.height), (16, 8));
    }
}
