//! Boundaries to the external parsing and recognition services.
//!
//! The engine only sees these traits; adapters live in their own crates.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use image::DynamicImage;
use thiserror::Error;

use crate::progress::ServiceProgressSink;

/// Failure reported by an external service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("service unavailable: {0}")]
    Unavailable(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{0}")]
    Failed(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// One text fragment of a page's text layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFragment {
    pub content: String,
}

impl TextFragment {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Parsing service: opens raw document bytes.
#[async_trait]
pub trait DocumentParser: Send + Sync {
    async fn open(&self, bytes: &[u8]) -> Result<Box<dyn ParsedDocument>, ServiceError>;
}

/// An opened document.
#[async_trait]
pub trait ParsedDocument: Send + Sync {
    fn page_count(&self) -> u32;

    /// Text fragments of `page` (1-based), in text-layer order.
    async fn page_fragments(&self, page: u32) -> Result<Vec<TextFragment>, ServiceError>;
}

/// Recognition service.
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Recognize text in `image`.
    ///
    /// `progress` may be called zero or more times before the call settles.
    async fn recognize(
        &self,
        image: &DynamicImage,
        languages: &LanguagePair,
        progress: &mut dyn ServiceProgressSink,
    ) -> Result<String, ServiceError>;
}

/// Fixed bilingual language hint, written `primary+secondary`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePair {
    pub primary: String,
    pub secondary: Option<String>,
}

impl LanguagePair {
    pub fn new(primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            secondary: Some(secondary.into()),
        }
    }

    pub fn single(primary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            secondary: None,
        }
    }

    /// Languages in preference order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary.as_str()).chain(self.secondary.as_deref())
    }
}

impl Default for LanguagePair {
    fn default() -> Self {
        Self::new("english", "latin")
    }
}

impl fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.secondary {
            Some(secondary) => write!(f, "{}+{}", self.primary, secondary),
            None => f.write_str(&self.primary),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid language pair `{0}` (expected `primary` or `primary+secondary`)")]
pub struct ParseLanguagePairError(String);

impl FromStr for LanguagePair {
    type Err = ParseLanguagePairError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('+').map(|p| p.trim()).collect();
        match parts.as_slice() {
            [primary] if !primary.is_empty() => Ok(Self::single(*primary)),
            [primary, secondary] if !primary.is_empty() && !secondary.is_empty() => {
                Ok(Self::new(*primary, *secondary))
            }
            _ => Err(ParseLanguagePairError(s.to_string())),
        }
    }
}
