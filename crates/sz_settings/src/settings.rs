use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::defaults::*;

/// Log output format selected for the host subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    // OCR
    /// Directory with the PaddleOCR model files.
    #[serde(default = "default_models_dir")]
    pub models_dir: String,
    /// Bilingual hint, `primary+secondary`.
    #[serde(default = "default_ocr_languages")]
    pub ocr_languages: String,

    // Zones
    #[serde(default = "default_min_zone_size")]
    pub min_zone_size: f32,

    // Input limits
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: u64,
    #[serde(default = "default_max_image_pixels")]
    pub max_image_pixels: u64,
    #[serde(default = "default_max_document_bytes")]
    pub max_document_bytes: u64,

    // Submission
    #[serde(default = "default_min_submit_chars")]
    pub min_submit_chars: usize,

    // Logging
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            models_dir: default_models_dir(),
            ocr_languages: default_ocr_languages(),
            min_zone_size: default_min_zone_size(),
            max_image_bytes: default_max_image_bytes(),
            max_image_pixels: default_max_image_pixels(),
            max_document_bytes: default_max_document_bytes(),
            min_submit_chars: default_min_submit_chars(),
            log_format: default_log_format(),
        }
    }
}

impl Settings {
    fn settings_dir() -> PathBuf {
        default_home_dir().join(".scanzone")
    }

    /// Default settings file location.
    pub fn default_path() -> PathBuf {
        Self::settings_dir().join("settings.json")
    }

    /// Load settings from the default location.
    ///
    /// Falls back to defaults if loading fails; a missing file is created with defaults.
    pub fn load() -> Self {
        let path = Self::default_path();
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                if path.exists() {
                    tracing::warn!(path = %path.display(), error = %e, "settings unreadable, using defaults");
                    return Self::default();
                }
                let defaults = Self::default();
                if let Err(e) = defaults.save() {
                    tracing::debug!(path = %path.display(), error = %e, "could not persist default settings");
                }
                defaults
            }
        }
    }

    /// Load settings from an explicit file. Missing fields take their defaults.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        let settings = serde_json::from_str::<Settings>(&content)
            .with_context(|| format!("parsing settings in {}", path.display()))?;
        Ok(settings)
    }

    /// Save settings to the default location.
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::default_path())
    }

    /// Save settings to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("writing settings to {}", path.display()))?;
        Ok(())
    }
}
