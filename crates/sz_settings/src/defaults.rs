use std::path::PathBuf;

use crate::settings::LogFormat;

// OCR defaults
pub fn default_models_dir() -> String {
    "models".to_string()
}

pub fn default_ocr_languages() -> String {
    "english+latin".to_string()
}

// Zone defaults (percent of the displayed image)
pub fn default_min_zone_size() -> f32 {
    1.0
}

// Input limits
pub fn default_max_image_bytes() -> u64 {
    10 * 1024 * 1024
}

pub fn default_max_image_pixels() -> u64 {
    40_000_000
}

pub fn default_max_document_bytes() -> u64 {
    25 * 1024 * 1024
}

// Submission gate
pub fn default_min_submit_chars() -> usize {
    10
}

pub fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

/// Base directory for per-user files.
pub fn default_home_dir() -> PathBuf {
    if let Ok(home_dir) = std::env::var("HOME") {
        return PathBuf::from(home_dir);
    }
    if let Ok(home_dir) = std::env::var("USERPROFILE") {
        return PathBuf::from(home_dir);
    }

    // Fallback: program directory.
    if let Ok(exe_path) = std::env::current_exe()
        && let Some(exe_dir) = exe_path.parent()
    {
        return exe_dir.to_path_buf();
    }

    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
