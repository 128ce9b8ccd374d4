use std::path::{Path, PathBuf};

use image::DynamicImage;
use ocr_rs::OcrEngine;
use sz_extract::LanguagePair;
use thiserror::Error;

use crate::types::{BoundingBox, OcrResult};

/// Default directory holding the model files, relative to the working directory.
pub const DEFAULT_MODELS_DIR: &str = "models";

/// Detection model, shared by all languages.
pub const DETECTION_MODEL: &str = "PP-OCRv5_mobile_det.mnn";

/// (id, display name, recognition model, charset)
const LANGUAGE_MODELS: [(&str, &str, &str, &str); 11] = [
    ("chinese", "Simplified Chinese", "PP-OCRv5_mobile_rec.mnn", "ppocr_keys_v5.txt"),
    ("english", "English", "en_PP-OCRv5_mobile_rec_infer.mnn", "ppocr_keys_en.txt"),
    ("korean", "Korean", "korean_PP-OCRv5_mobile_rec_infer.mnn", "ppocr_keys_korean.txt"),
    ("arabic", "Arabic", "arabic_PP-OCRv5_mobile_rec_infer.mnn", "ppocr_keys_arabic.txt"),
    ("cyrillic", "Cyrillic", "cyrillic_PP-OCRv5_mobile_rec_infer.mnn", "ppocr_keys_cyrillic.txt"),
    ("devanagari", "Devanagari", "devanagari_PP-OCRv5_mobile_rec_infer.mnn", "ppocr_keys_devanagari.txt"),
    ("latin", "Latin", "latin_PP-OCRv5_mobile_rec_infer.mnn", "ppocr_keys_latin.txt"),
    ("greek", "Greek", "el_PP-OCRv5_mobile_rec_infer.mnn", "ppocr_keys_el.txt"),
    ("thai", "Thai", "th_PP-OCRv5_mobile_rec_infer.mnn", "ppocr_keys_th.txt"),
    ("tamil", "Tamil", "ta_PP-OCRv5_mobile_rec_infer.mnn", "ppocr_keys_ta.txt"),
    ("telugu", "Telugu", "te_PP-OCRv5_mobile_rec_infer.mnn", "ppocr_keys_te.txt"),
];

/// OCR setup and recognition errors.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("no recognition model available for `{requested}` in {models_dir}")]
    NoLanguageAvailable {
        requested: String,
        models_dir: PathBuf,
    },

    #[error("model file is missing: {}", .0.display())]
    ModelMissing(PathBuf),

    #[error("failed to create the OCR engine: {0}")]
    EngineInit(String),

    #[error("OCR recognition failed: {0}")]
    Recognition(String),
}

/// One installed recognition language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrLanguageInfo {
    /// Language identifier (e.g. "english", "latin").
    pub id: String,
    pub display_name: String,
    /// Recognition model filename.
    pub rec_model: String,
    /// Charset filename.
    pub charset_file: String,
}

/// Resolved model file paths for one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPaths {
    pub language: String,
    pub detection: PathBuf,
    pub recognition: PathBuf,
    pub charset: PathBuf,
}

/// Host-provided OCR configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrConfig {
    /// Directory containing the model files.
    pub models_dir: PathBuf,
    pub languages: LanguagePair,
}

impl OcrConfig {
    pub fn new(models_dir: impl Into<PathBuf>, languages: LanguagePair) -> Self {
        Self {
            models_dir: models_dir.into(),
            languages,
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MODELS_DIR, LanguagePair::default())
    }
}

/// Languages whose recognition model and charset are both present in `models_dir`.
pub fn get_available_languages(models_dir: &Path) -> Vec<OcrLanguageInfo> {
    LANGUAGE_MODELS
        .iter()
        .filter(|(_, _, rec_model, charset)| {
            models_dir.join(rec_model).exists() && models_dir.join(charset).exists()
        })
        .map(|(id, display_name, rec_model, charset)| OcrLanguageInfo {
            id: id.to_string(),
            display_name: display_name.to_string(),
            rec_model: rec_model.to_string(),
            charset_file: charset.to_string(),
        })
        .collect()
}

/// Model paths for the first language of the pair that is installed.
///
/// One PaddleOCR engine recognizes one script; for `english+latin` the English
/// model is used when present and Latin otherwise.
pub fn get_model_paths(config: &OcrConfig) -> Result<ModelPaths, OcrError> {
    let available = get_available_languages(&config.models_dir);
    let info = config
        .languages
        .iter()
        .find_map(|lang| available.iter().find(|l| l.id == lang))
        .ok_or_else(|| OcrError::NoLanguageAvailable {
            requested: config.languages.to_string(),
            models_dir: config.models_dir.clone(),
        })?;

    let detection = config.models_dir.join(DETECTION_MODEL);
    if !detection.exists() {
        return Err(OcrError::ModelMissing(detection));
    }

    Ok(ModelPaths {
        language: info.id.clone(),
        detection,
        recognition: config.models_dir.join(&info.rec_model),
        charset: config.models_dir.join(&info.charset_file),
    })
}

/// Check whether model files exist for the given config.
pub fn models_exist(config: &OcrConfig) -> bool {
    get_model_paths(config).is_ok()
}

/// Create an OCR engine instance.
pub fn create_engine(config: &OcrConfig) -> Result<OcrEngine, OcrError> {
    let paths = get_model_paths(config)?;
    tracing::debug!(language = %paths.language, models_dir = %config.models_dir.display(), "creating OCR engine");

    OcrEngine::new(&paths.detection, &paths.recognition, &paths.charset, None)
        .map_err(|e| OcrError::EngineInit(e.to_string()))
}

/// Recognize text blocks in a decoded image, dropping blank blocks.
pub fn recognize_image(engine: &OcrEngine, image: &DynamicImage) -> Result<Vec<OcrResult>, OcrError> {
    let raw = engine
        .recognize(image)
        .map_err(|e| OcrError::Recognition(e.to_string()))?;

    Ok(raw
        .into_iter()
        .filter(|r| !r.text.trim().is_empty())
        .map(|r| OcrResult {
            text: r.text,
            confidence: r.confidence,
            bounding_box: BoundingBox {
                x: r.bbox.rect.left(),
                y: r.bbox.rect.top(),
                width: r.bbox.rect.width() as i32,
                height: r.bbox.rect.height() as i32,
            },
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn install(dir: &Path, files: &[&str]) {
        for file in files {
            fs::write(dir.join(file), b"stub").unwrap();
        }
    }

    #[test]
    fn only_complete_languages_are_available() {
        let dir = tempfile::tempdir().unwrap();
        install(
            dir.path(),
            &[
                "latin_PP-OCRv5_mobile_rec_infer.mnn",
                "ppocr_keys_latin.txt",
                // english model without its charset
                "en_PP-OCRv5_mobile_rec_infer.mnn",
            ],
        );

        let ids: Vec<String> = get_available_languages(dir.path())
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(ids, vec!["latin".to_string()]);
    }

    #[test]
    fn pair_prefers_primary_then_falls_back_to_secondary() {
        let dir = tempfile::tempdir().unwrap();
        install(
            dir.path(),
            &[
                DETECTION_MODEL,
                "latin_PP-OCRv5_mobile_rec_infer.mnn",
                "ppocr_keys_latin.txt",
            ],
        );
        let config = OcrConfig::new(dir.path(), LanguagePair::default());
        let paths = get_model_paths(&config).unwrap();
        assert_eq!(paths.language, "latin");

        install(
            dir.path(),
            &["en_PP-OCRv5_mobile_rec_infer.mnn", "ppocr_keys_en.txt"],
        );
        let paths = get_model_paths(&config).unwrap();
        assert_eq!(paths.language, "english");
        assert_eq!(paths.charset, dir.path().join("ppocr_keys_en.txt"));
        assert!(models_exist(&config));
    }

    #[test]
    fn missing_models_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config = OcrConfig::new(dir.path(), LanguagePair::single("greek"));
        assert!(matches!(
            get_model_paths(&config),
            Err(OcrError::NoLanguageAvailable { .. })
        ));
        assert!(!models_exist(&config));

        install(dir.path(), &["el_PP-OCRv5_mobile_rec_infer.mnn", "ppocr_keys_el.txt"]);
        assert!(matches!(
            get_model_paths(&config),
            Err(OcrError::ModelMissing(_))
        ));
    }
}
