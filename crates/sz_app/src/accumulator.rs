//! Merging extraction results into the user-visible text buffer.
//!
//! The buffer itself lives with the caller (it is also edited by hand), so
//! everything here is a pure function of `(buffer, incoming)`.

use thiserror::Error;

/// Separator placed between the existing buffer and a new extraction.
pub const SEPARATOR: &str = "\n\n";

/// Minimum text length accepted by the downstream classifier.
pub const DEFAULT_MIN_SUBMIT_CHARS: usize = 10;

/// Result of merging one extraction into the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The extraction was empty; the buffer is unchanged.
    NothingExtracted,
    /// The new buffer contents.
    Appended(String),
}

impl AppendOutcome {
    /// Buffer after the merge, given the buffer before it.
    pub fn into_buffer(self, existing: &str) -> String {
        match self {
            AppendOutcome::NothingExtracted => existing.to_string(),
            AppendOutcome::Appended(buffer) => buffer,
        }
    }
}

/// Merge `incoming` into `existing`.
///
/// - empty `incoming`: [`AppendOutcome::NothingExtracted`]
/// - blank `existing`: `incoming` verbatim
/// - otherwise: `trim(existing) + "\n\n" + incoming`
///
/// Repeated text is not deduplicated.
pub fn append(existing: &str, incoming: &str) -> AppendOutcome {
    if incoming.trim().is_empty() {
        return AppendOutcome::NothingExtracted;
    }

    let kept = existing.trim();
    if kept.is_empty() {
        return AppendOutcome::Appended(incoming.to_string());
    }

    let mut buffer = String::with_capacity(kept.len() + SEPARATOR.len() + incoming.len());
    buffer.push_str(kept);
    buffer.push_str(SEPARATOR);
    buffer.push_str(incoming);
    AppendOutcome::Appended(buffer)
}

/// Why a buffer cannot be handed to the classifier yet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("there is no text to analyze")]
    Empty,
    #[error("text is too short to analyze ({len} of at least {min} characters)")]
    TooShort { len: usize, min: usize },
}

/// Trimmed buffer ready for classification.
pub fn submission_text(buffer: &str, min_chars: usize) -> Result<&str, SubmitError> {
    let text = buffer.trim();
    if text.is_empty() {
        return Err(SubmitError::Empty);
    }

    let len = text.chars().count();
    if len < min_chars {
        return Err(SubmitError::TooShort { len, min: min_chars });
    }

    Ok(text)
}
