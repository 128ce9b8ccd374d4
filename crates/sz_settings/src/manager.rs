use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::{LogFormat, Settings};

/// Unified config manager.
pub struct ConfigManager {
    settings: Arc<RwLock<Settings>>,
    /// Explicit settings file; `None` means the default location.
    path: Option<PathBuf>,
}

impl ConfigManager {
    /// Create a config manager over the default settings file (loads once and caches).
    pub fn new() -> Self {
        Self {
            settings: Arc::new(RwLock::new(Settings::load())),
            path: None,
        }
    }

    /// Create a config manager over an explicit settings file.
    pub fn from_path(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let settings = Settings::load_from(&path)?;
        Ok(Self {
            settings: Arc::new(RwLock::new(settings)),
            path: Some(path),
        })
    }

    /// Wrap already-built settings (nothing is read from disk).
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings: Arc::new(RwLock::new(settings)),
            path: None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Get a snapshot copy of current settings.
    pub fn get(&self) -> Settings {
        self.settings.read().clone()
    }

    /// Get the shared settings reference.
    pub fn get_shared(&self) -> Arc<RwLock<Settings>> {
        Arc::clone(&self.settings)
    }

    /// Reload settings from disk. Keeps the current snapshot if the explicit file is unreadable.
    pub fn reload(&mut self) -> anyhow::Result<()> {
        let fresh = match &self.path {
            Some(path) => Settings::load_from(path)?,
            None => Settings::load(),
        };
        *self.settings.write() = fresh;
        Ok(())
    }

    // Convenience accessors.

    #[inline]
    pub fn models_dir(&self) -> String {
        self.settings.read().models_dir.clone()
    }

    #[inline]
    pub fn ocr_languages(&self) -> String {
        self.settings.read().ocr_languages.clone()
    }

    #[inline]
    pub fn min_zone_size(&self) -> f32 {
        self.settings.read().min_zone_size
    }

    #[inline]
    pub fn min_submit_chars(&self) -> usize {
        self.settings.read().min_submit_chars
    }

    #[inline]
    pub fn log_format(&self) -> LogFormat {
        self.settings.read().log_format
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
