//! Ticket exporter
//!
//! Captures the ticket for the current selection and saves it as
//! `date-ticket.png`. Export failures are logged and reported as an
//! outcome; they never escape as errors.

use super::capture::{capture_region, EXPORT_SCALE};
use super::card::TicketCard;
use super::fetch::ImageFetcher;
use crate::mail::{compress, CompressedImage};
use crate::models::DateOption;
use crate::{DateQuestError, Result, TICKET_FILE};
use chrono::NaiveDate;
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Outcome of a PNG export
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The ticket was written to this path
    Saved(PathBuf),
    /// Nothing was written
    Failed(String),
}

impl ExportOutcome {
    /// Check whether a file was written
    pub fn is_saved(&self) -> bool {
        matches!(self, ExportOutcome::Saved(_))
    }
}

/// Captures and saves date tickets
#[derive(Debug, Clone)]
pub struct TicketExporter<F> {
    fetcher: F,
    download_dir: PathBuf,
    scale: u32,
    issued: NaiveDate,
}

impl<F: ImageFetcher> TicketExporter<F> {
    /// Create an exporter saving into `download_dir` at the export scale
    pub fn new(fetcher: F, download_dir: PathBuf) -> Self {
        Self {
            fetcher,
            download_dir,
            scale: EXPORT_SCALE,
            issued: chrono::Local::now().date_naive(),
        }
    }

    #[cfg(test)]
    fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale;
        self
    }

    /// Override the issue date printed on the ticket
    pub fn with_issued(mut self, issued: NaiveDate) -> Self {
        self.issued = issued;
        self
    }

    /// Path the PNG is written to
    pub fn target_path(&self) -> PathBuf {
        self.download_dir.join(TICKET_FILE)
    }

    /// Date printed on captured tickets
    pub fn issued(&self) -> NaiveDate {
        self.issued
    }

    /// Capture the ticket for `selection`.
    ///
    /// Waits for the picture to load first; a picture that cannot be
    /// fetched or decoded fails the capture.
    pub async fn capture(&self, selection: &DateOption) -> Result<RgbaImage> {
        let bytes = self.fetcher.fetch(&selection.image_ref).await?;
        let picture = image::load_from_memory(&bytes).map_err(|e| {
            DateQuestError::CaptureError(format!("Failed to decode ticket image: {}", e))
        })?;

        let card = TicketCard::new(selection, self.issued);
        capture_region(card, Some(&picture), self.scale)
    }

    /// Capture the ticket and compress it into a JPEG of at most
    /// `max_kb` KiB, for use as an email attachment
    pub async fn capture_jpeg(&self, selection: &DateOption, max_kb: u32) -> Result<CompressedImage> {
        let image = self.capture(selection).await?;
        compress(&image, max_kb)
    }

    /// Capture and save the ticket as a PNG
    pub async fn export_png(&self, selection: &DateOption) -> ExportOutcome {
        let result = async {
            let image = self.capture(selection).await?;
            let png = encode_png(&image)?;
            let path = self.target_path();
            write_file(&path, &png).await?;
            Ok::<_, DateQuestError>(path)
        }
        .await;

        match result {
            Ok(path) => {
                info!(path = %path.display(), "ticket saved");
                ExportOutcome::Saved(path)
            }
            Err(err) => {
                error!(error = %err, title = %selection.title, "ticket export failed");
                ExportOutcome::Failed(err.to_string())
            }
        }
    }
}

/// Encode a capture as PNG bytes
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(image.clone()).write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, bytes).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog;
    use image::{Rgba, RgbaImage};
    use std::collections::HashMap;

    /// Serves fixed bytes per reference; unknown references fail
    struct MapFetcher(HashMap<String, Vec<u8>>);

    impl ImageFetcher for MapFetcher {
        async fn fetch(&self, image_ref: &str) -> Result<Vec<u8>> {
            self.0.get(image_ref).cloned().ok_or_else(|| {
                DateQuestError::CaptureError(format!("unreachable: {}", image_ref))
            })
        }
    }

    fn png_bytes() -> Vec<u8> {
        let img = RgbaImage::from_pixel(32, 24, Rgba([200, 40, 90, 255]));
        encode_png(&img).unwrap()
    }

    fn issued() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 14).unwrap()
    }

    #[tokio::test]
    async fn test_export_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let option = catalog().remove(1);
        let fetcher = MapFetcher([(option.image_ref.clone(), png_bytes())].into_iter().collect());
        let exporter = TicketExporter::new(fetcher, dir.path().to_path_buf()).with_issued(issued());

        let outcome = exporter.export_png(&option).await;
        let path = dir.path().join("date-ticket.png");
        assert_eq!(outcome, ExportOutcome::Saved(path.clone()));

        let bytes = std::fs::read(&path).unwrap();
        assert!(!bytes.is_empty());
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Png);
    }

    #[tokio::test]
    async fn test_unreachable_image_degrades_without_download() {
        let dir = tempfile::tempdir().unwrap();
        let option = catalog().remove(0);
        let exporter = TicketExporter::new(MapFetcher(HashMap::new()), dir.path().to_path_buf());

        let outcome = exporter.export_png(&option).await;
        assert!(matches!(outcome, ExportOutcome::Failed(_)));
        assert!(!dir.path().join("date-ticket.png").exists());
    }

    #[tokio::test]
    async fn test_undecodable_image_fails_capture() {
        let option = catalog().remove(0);
        let fetcher = MapFetcher([(option.image_ref.clone(), b"not an image".to_vec())].into_iter().collect());
        let exporter = TicketExporter::new(fetcher, PathBuf::from("."));

        let result = exporter.capture(&option).await;
        assert!(matches!(result, Err(DateQuestError::CaptureError(_))));
    }

    #[tokio::test]
    async fn test_capture_scale_override() {
        let option = catalog().remove(2);
        let fetcher = MapFetcher([(option.image_ref.clone(), png_bytes())].into_iter().collect());
        let exporter = TicketExporter::new(fetcher, PathBuf::from(".")).with_scale(1);

        let single = exporter.capture(&option).await.unwrap();
        let exporter = exporter.with_scale(2);
        let double = exporter.capture(&option).await.unwrap();
        assert_eq!(double.width(), single.width() * 2);
        assert_eq!(double.height(), single.height() * 2);
    }

    #[tokio::test]
    async fn test_capture_jpeg_respects_budget() {
        let option = catalog().remove(0);
        let fetcher = MapFetcher([(option.image_ref.clone(), png_bytes())].into_iter().collect());
        let exporter = TicketExporter::new(fetcher, PathBuf::from(".")).with_issued(issued());

        let jpeg = exporter.capture_jpeg(&option, 30).await.unwrap();
        assert!(jpeg.within_budget);
        assert!(jpeg.len() <= 30 * 1024);
        assert_eq!(image::guess_format(&jpeg.bytes).unwrap(), ImageFormat::Jpeg);
    }
}
