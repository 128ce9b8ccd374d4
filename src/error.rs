// Host error handling
//
// Library crates keep their own error enums; the host folds them into one type.

use std::io;
use std::path::PathBuf;

use sz_app::SubmitError;
use sz_extract::ExtractError;
use thiserror::Error;

/// Main application error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Submission rejected: {0}")]
    Submit(#[from] SubmitError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported input {}: expected a PDF or an image", .0.display())]
    UnsupportedInput(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Whether the user can fix this by changing the input (as opposed to a service failure).
    pub fn is_user_error(&self) -> bool {
        match self {
            AppError::Extract(e) => e.is_precondition(),
            AppError::Submit(_) | AppError::UnsupportedInput(_) | AppError::Config(_) => true,
            AppError::Io(_) | AppError::Other(_) => false,
        }
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precondition_failures_are_user_errors() {
        assert!(AppError::from(ExtractError::NoZones).is_user_error());
        assert!(AppError::from(SubmitError::Empty).is_user_error());
        assert!(!AppError::from(io::Error::other("disk")).is_user_error());
    }
}
