//! Text recognition through a local PaddleOCR engine (`ocr-rs`).

pub mod engine;
pub mod recognizer;
pub mod types;

// Re-export the engine type so downstream crates don't need to depend on `ocr-rs` directly.
pub use ocr_rs::OcrEngine;

pub use engine::{
    DEFAULT_MODELS_DIR, DETECTION_MODEL, ModelPaths, OcrConfig, OcrError, OcrLanguageInfo,
    create_engine, get_available_languages, get_model_paths, models_exist, recognize_image,
};
pub use recognizer::OcrRecognizer;
pub use types::{
    BoundingBox, LINE_HEIGHT_THRESHOLD, OcrResult, group_into_lines, join_result_texts_trimmed,
};
