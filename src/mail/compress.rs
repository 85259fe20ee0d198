//! Attachment compression
//!
//! A bounded search over (quality, dimensions) for the first JPEG encoding
//! that fits a byte budget. Quality decays geometrically at each size level;
//! when no quality fits, both dimensions shrink and the search repeats.
//! Below the width floor the smallest encoding seen is returned instead.

use crate::util::kilobytes;
use crate::{DateQuestError, Result};
use image::{codecs::jpeg::JpegEncoder, imageops::FilterType, DynamicImage, RgbImage, RgbaImage};
use tracing::debug;

/// Search parameters
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionOptions {
    /// JPEG quality of the first attempt (1-100)
    pub initial_quality: u8,
    /// Multiplier applied to quality after each oversized attempt
    pub quality_decay: f32,
    /// Lowest quality tried at any size
    pub min_quality: u8,
    /// Multiplier applied to both dimensions per size level
    pub dimension_decay: f32,
    /// Width below which no further size level is tried
    pub min_width: u32,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            initial_quality: 80,
            quality_decay: 0.8,
            min_quality: 10,
            dimension_decay: 0.8,
            min_width: 200,
        }
    }
}

/// A JPEG encoding chosen by the search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub quality: u8,
    /// False when the floor was reached and this is the best effort
    pub within_budget: bool,
}

impl CompressedImage {
    /// Encoded size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the encoding is empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Compress `image` to at most `max_kilobytes` KiB with default options
pub fn compress(image: &RgbaImage, max_kilobytes: u32) -> Result<CompressedImage> {
    compress_with(
        image,
        kilobytes(max_kilobytes),
        &CompressionOptions::default(),
    )
}

/// Compress `image` to at most `max_bytes`.
///
/// Never gives up on size: when nothing fits, the smallest attempt is
/// returned with `within_budget` unset. An empty image yields an empty
/// result. Only an encoder failure is an error.
pub fn compress_with(
    image: &RgbaImage,
    max_bytes: usize,
    options: &CompressionOptions,
) -> Result<CompressedImage> {
    if image.width() == 0 || image.height() == 0 {
        return Ok(CompressedImage {
            bytes: Vec::new(),
            width: image.width(),
            height: image.height(),
            quality: options.initial_quality,
            within_budget: true,
        });
    }

    let source = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
    let mut width = source.width();
    let mut height = source.height();
    let mut best: Option<CompressedImage> = None;

    loop {
        let frame = if width == source.width() && height == source.height() {
            source.clone()
        } else {
            image::imageops::resize(&source, width, height, FilterType::Triangle)
        };

        let mut quality = options.initial_quality.clamp(1, 100) as f32;
        loop {
            let q = quality.round() as u8;
            let bytes = encode_jpeg(&frame, q)?;
            debug!(width, height, quality = q, size = bytes.len(), "jpeg attempt");

            if bytes.len() <= max_bytes {
                return Ok(CompressedImage {
                    bytes,
                    width,
                    height,
                    quality: q,
                    within_budget: true,
                });
            }

            if best.as_ref().map_or(true, |b| bytes.len() < b.bytes.len()) {
                best = Some(CompressedImage {
                    bytes,
                    width,
                    height,
                    quality: q,
                    within_budget: false,
                });
            }

            let next = quality * options.quality_decay;
            if next < options.min_quality as f32 || next >= quality {
                break;
            }
            quality = next;
        }

        let next_width = (width as f32 * options.dimension_decay).round() as u32;
        let next_height = ((height as f32 * options.dimension_decay).round() as u32).max(1);
        if next_width < options.min_width || next_width >= width {
            break;
        }
        width = next_width;
        height = next_height;
    }

    best.ok_or_else(|| DateQuestError::CaptureError("No encoding attempted".to_string()))
}

fn encode_jpeg(frame: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100))
        .encode_image(frame)?;
    Ok(bytes)
}
