use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use image::DynamicImage;
use ocr_rs::OcrEngine;
use parking_lot::Mutex;
use sz_extract::{LanguagePair, Recognizer, ServiceError, ServiceProgress, ServiceProgressSink};
use tracing::{debug, info, warn};

use crate::engine::{OcrConfig, OcrError, create_engine, models_exist, recognize_image};
use crate::types::{LINE_HEIGHT_THRESHOLD, group_into_lines, join_result_texts_trimmed};

const STATUS_LOADING: &str = "loading recognition engine";
const STATUS_RECOGNIZING: &str = "recognizing text";

struct LoadedEngine {
    languages: LanguagePair,
    engine: OcrEngine,
}

/// [`Recognizer`] backed by a local PaddleOCR engine.
///
/// The engine is created on first use and kept until the language pair changes
/// or [`OcrRecognizer::unload`] is called. Recognition runs on the blocking pool.
pub struct OcrRecognizer {
    models_dir: PathBuf,
    slot: Arc<Mutex<Option<LoadedEngine>>>,
}

impl OcrRecognizer {
    pub fn new(models_dir: impl Into<PathBuf>) -> Self {
        Self {
            models_dir: models_dir.into(),
            slot: Arc::new(Mutex::new(None)),
        }
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    /// Whether models for `languages` are installed.
    pub fn is_available(&self, languages: &LanguagePair) -> bool {
        models_exist(&OcrConfig::new(&self.models_dir, languages.clone()))
    }

    pub fn is_loaded(&self) -> bool {
        self.slot.try_lock().is_some_and(|guard| guard.is_some())
    }

    /// Drop the cached engine.
    pub fn unload(&self) {
        if self.slot.lock().take().is_some() {
            debug!("OCR engine unloaded");
        }
    }
}

fn ensure_engine<'a>(
    slot: &'a mut Option<LoadedEngine>,
    config: &OcrConfig,
) -> Result<&'a OcrEngine, OcrError> {
    let stale = slot
        .as_ref()
        .is_some_and(|loaded| loaded.languages != config.languages);
    if stale {
        *slot = None;
    }

    if slot.is_none() {
        let start = Instant::now();
        let engine = create_engine(config)?;
        info!(languages = %config.languages, elapsed = ?start.elapsed(), "OCR engine started");
        *slot = Some(LoadedEngine {
            languages: config.languages.clone(),
            engine,
        });
    }

    slot.as_ref()
        .map(|loaded| &loaded.engine)
        .ok_or_else(|| OcrError::EngineInit("engine slot is empty".to_string()))
}

impl From<OcrError> for ServiceError {
    fn from(err: OcrError) -> Self {
        match err {
            OcrError::NoLanguageAvailable { .. } | OcrError::ModelMissing(_) => {
                ServiceError::Unavailable(err.to_string())
            }
            OcrError::EngineInit(_) | OcrError::Recognition(_) => {
                ServiceError::Failed(err.to_string())
            }
        }
    }
}

#[async_trait]
impl Recognizer for OcrRecognizer {
    async fn recognize(
        &self,
        image: &DynamicImage,
        languages: &LanguagePair,
        progress: &mut dyn ServiceProgressSink,
    ) -> Result<String, ServiceError> {
        // ocr-rs has no progress callback; report phase boundaries only.
        progress.report(ServiceProgress::new(STATUS_LOADING, 0.0));

        let config = OcrConfig::new(&self.models_dir, languages.clone());
        let slot = Arc::clone(&self.slot);
        let image = image.clone();

        let blocks = tokio::task::spawn_blocking(move || {
            let mut guard = slot.lock();
            let engine = ensure_engine(&mut guard, &config)?;
            recognize_image(engine, &image)
        })
        .await
        .map_err(|e| ServiceError::Failed(format!("recognition task aborted: {e}")))?
        .map_err(|e| {
            warn!(error = %e, "OCR recognition failed");
            ServiceError::from(e)
        })?;

        let lines = group_into_lines(blocks, LINE_HEIGHT_THRESHOLD);
        debug!(lines = lines.len(), "OCR lines grouped");
        progress.report(ServiceProgress::new(STATUS_RECOGNIZING, 1.0));

        Ok(join_result_texts_trimmed(&lines))
    }
}
