use std::fmt;
use std::sync::Arc;

use sz_app::{ExtractionProgress, RegisteredZone};
use sz_geometry::NormalizedZone;
use tracing::{debug, info, instrument, warn};

use crate::error::ExtractError;
use crate::progress::{ProgressSink, ServiceProgress};
use crate::raster::{SourceImage, crop_for, rasterize_crop};
use crate::service::{DocumentParser, LanguagePair, Recognizer, TextFragment};

/// Separator between pages and between labelled areas.
const BLOCK_SEPARATOR: &str = "\n\n";

/// Trimmed extraction result.
///
/// Empty means "no text found", which is a valid outcome and not an error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractedText(String);

impl ExtractedText {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for ExtractedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExtractedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bounds checked before any service call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineLimits {
    pub max_document_bytes: u64,
    /// Largest image (in pixels) handed to the recognition service.
    pub max_recognition_pixels: u64,
}

impl Default for EngineLimits {
    fn default() -> Self {
        Self {
            max_document_bytes: 25 * 1024 * 1024,
            max_recognition_pixels: 40_000_000,
        }
    }
}

/// Extraction engine.
///
/// Stateless apart from its collaborators. Every entry point is one sequential task:
/// pages and zones are processed strictly in increasing order, each awaited before the
/// next starts, and any service failure discards everything gathered so far.
pub struct ExtractionEngine {
    parser: Arc<dyn DocumentParser>,
    recognizer: Arc<dyn Recognizer>,
    languages: LanguagePair,
    limits: EngineLimits,
}

impl ExtractionEngine {
    pub fn new(
        parser: Arc<dyn DocumentParser>,
        recognizer: Arc<dyn Recognizer>,
        languages: LanguagePair,
    ) -> Self {
        Self {
            parser,
            recognizer,
            languages,
            limits: EngineLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: EngineLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn languages(&self) -> &LanguagePair {
        &self.languages
    }

    pub fn limits(&self) -> &EngineLimits {
        &self.limits
    }

    /// Extract the text layer of a document, page by page.
    #[instrument(skip_all, fields(bytes = bytes.len()))]
    pub async fn extract_document_text(
        &self,
        bytes: &[u8],
        progress: &mut dyn ProgressSink,
    ) -> Result<ExtractedText, ExtractError> {
        if bytes.is_empty() {
            return Err(ExtractError::EmptyDocument);
        }
        let len = bytes.len() as u64;
        if len > self.limits.max_document_bytes {
            return Err(ExtractError::InputTooLarge {
                what: "document",
                actual: len,
                limit: self.limits.max_document_bytes,
            });
        }

        let document = self.parser.open(bytes).await.map_err(|e| {
            warn!(error = %e, "document could not be opened");
            ExtractError::OpenDocument(e)
        })?;

        let total = document.page_count();
        if total == 0 {
            return Err(ExtractError::EmptyDocument);
        }

        let mut pages = Vec::with_capacity(total as usize);
        for page in 1..=total {
            let fragments = document.page_fragments(page).await.map_err(|source| {
                warn!(page, total, error = %source, "page text retrieval failed");
                ExtractError::Page { page, source }
            })?;

            let text = join_fragments(&fragments);
            debug!(page, total, chars = text.len(), "page text retrieved");
            pages.push(text);

            progress.report(ExtractionProgress::new(
                format!("Reading page {page}/{total}"),
                page_percent(page, total),
            ));
        }

        let text = ExtractedText::new(pages.join(BLOCK_SEPARATOR));
        info!(pages = total, chars = text.as_str().len(), "document text extracted");
        Ok(text)
    }

    /// Recognize text over the whole image.
    #[instrument(skip_all, fields(width = source.natural_width(), height = source.natural_height()))]
    pub async fn extract_whole_image_text(
        &self,
        source: &SourceImage,
        progress: &mut dyn ProgressSink,
    ) -> Result<ExtractedText, ExtractError> {
        source.ensure_ready()?;
        self.check_recognition_size(source.pixel_count())?;

        let text = self
            .recognize(source.image(), "", progress)
            .await
            .map_err(|e| {
                warn!(error = %e, "whole-image recognition failed");
                ExtractError::Recognition(e)
            })?;
        progress.report(ExtractionProgress::new("Done", 100));

        info!(chars = text.as_str().len(), "image text recognized");
        Ok(text)
    }

    /// Recognize text inside one zone.
    #[instrument(skip_all)]
    pub async fn extract_zone_text(
        &self,
        source: &SourceImage,
        zone: &NormalizedZone,
        progress: &mut dyn ProgressSink,
    ) -> Result<ExtractedText, ExtractError> {
        source.ensure_ready()?;
        let crop = crop_for(source, zone)?;
        self.check_recognition_size(crop.area())?;

        let image = rasterize_crop(source, &crop);
        let text = self.recognize(&image, "", progress).await.map_err(|e| {
            warn!(error = %e, "zone recognition failed");
            ExtractError::Recognition(e)
        })?;
        progress.report(ExtractionProgress::new("Done", 100));
        Ok(text)
    }

    /// Recognize each zone in order and label the results `Area <i>: <text>`.
    ///
    /// Every crop is sized and checked before the first recognition call. Zones that
    /// yield no text contribute nothing; if none do, the result is empty.
    #[instrument(skip_all, fields(zones = zones.len()))]
    pub async fn extract_zones_text(
        &self,
        source: &SourceImage,
        zones: &[RegisteredZone],
        progress: &mut dyn ProgressSink,
    ) -> Result<ExtractedText, ExtractError> {
        if zones.is_empty() {
            return Err(ExtractError::NoZones);
        }
        source.ensure_ready()?;

        let crops = zones
            .iter()
            .map(|registered| {
                let crop = crop_for(source, &registered.zone)?;
                self.check_recognition_size(crop.area())?;
                Ok(crop)
            })
            .collect::<Result<Vec<_>, ExtractError>>()?;

        let count = zones.len();
        let mut fragments = Vec::with_capacity(count);
        for (index, (registered, crop)) in zones.iter().zip(&crops).enumerate() {
            let area = index + 1;
            let image = rasterize_crop(source, crop);

            let prefix = format!("Area {area}/{count}: ");
            let text = self
                .recognize(&image, &prefix, progress)
                .await
                .map_err(|source| {
                    warn!(area, count, zone = %registered.id, error = %source, "zone recognition failed");
                    ExtractError::ZoneRecognition { area, source }
                })?;

            debug!(area, count, zone = %registered.id, chars = text.as_str().len(), "zone recognized");
            if !text.is_empty() {
                fragments.push(format!("Area {area}: {text}"));
            }
        }

        progress.report(ExtractionProgress::new("Done", 100));

        let text = ExtractedText::new(fragments.join(BLOCK_SEPARATOR));
        info!(zones = count, chars = text.as_str().len(), "zone text recognized");
        Ok(text)
    }

    fn check_recognition_size(&self, pixels: u64) -> Result<(), ExtractError> {
        if pixels > self.limits.max_recognition_pixels {
            return Err(ExtractError::InputTooLarge {
                what: "image",
                actual: pixels,
                limit: self.limits.max_recognition_pixels,
            });
        }
        Ok(())
    }

    /// One recognition call, forwarding service progress with `status_prefix`.
    async fn recognize(
        &self,
        image: &image::DynamicImage,
        status_prefix: &str,
        progress: &mut dyn ProgressSink,
    ) -> Result<ExtractedText, crate::service::ServiceError> {
        let mut forward = |p: ServiceProgress| {
            progress.report(ExtractionProgress::from_fraction(
                format!("{status_prefix}{}", p.status),
                p.progress,
            ));
        };

        let raw = self
            .recognizer
            .recognize(image, &self.languages, &mut forward)
            .await?;
        Ok(ExtractedText::new(raw))
    }
}

/// Join a page's fragments with single spaces and trim.
pub fn join_fragments(fragments: &[TextFragment]) -> String {
    fragments
        .iter()
        .map(|f| f.content.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Percent complete after `page` of `total` pages.
fn page_percent(page: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    ((f64::from(page) / f64::from(total)) * 100.0).round().min(100.0) as u8
}
