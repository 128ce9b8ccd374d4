use thiserror::Error;

use crate::raster::RasterError;
use crate::service::ServiceError;

/// Failure classes callers must branch on.
///
/// An empty extraction is not an error; it is an empty [`crate::ExtractedText`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected before any service call. Show a corrective message, do not retry.
    Precondition,
    /// The parsing or recognition service failed. Nothing partial was kept.
    Service,
}

/// Extraction error.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("the document is empty")]
    EmptyDocument,

    #[error("no zones to extract")]
    NoZones,

    #[error("the source image is not ready")]
    SourceNotReady,

    #[error("{what} is too large ({actual} > {limit})")]
    InputTooLarge {
        what: &'static str,
        actual: u64,
        limit: u64,
    },

    #[error("the image could not be decoded: {0}")]
    Decode(#[source] RasterError),

    #[error("the document could not be opened: {0}")]
    OpenDocument(#[source] ServiceError),

    #[error("page {page} could not be read: {source}")]
    Page {
        page: u32,
        #[source]
        source: ServiceError,
    },

    #[error("text recognition failed: {0}")]
    Recognition(#[source] ServiceError),

    #[error("text recognition failed in area {area}: {source}")]
    ZoneRecognition {
        area: usize,
        #[source]
        source: ServiceError,
    },
}

impl ExtractError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExtractError::EmptyDocument
            | ExtractError::NoZones
            | ExtractError::SourceNotReady
            | ExtractError::InputTooLarge { .. }
            | ExtractError::Decode(_) => ErrorKind::Precondition,
            ExtractError::OpenDocument(_)
            | ExtractError::Page { .. }
            | ExtractError::Recognition(_)
            | ExtractError::ZoneRecognition { .. } => ErrorKind::Service,
        }
    }

    pub fn is_precondition(&self) -> bool {
        self.kind() == ErrorKind::Precondition
    }
}

impl From<RasterError> for ExtractError {
    fn from(err: RasterError) -> Self {
        match err {
            RasterError::SourceNotReady => ExtractError::SourceNotReady,
            RasterError::TooLarge {
                unit,
                actual,
                limit,
            } => ExtractError::InputTooLarge {
                what: if unit == "bytes" {
                    "image file"
                } else {
                    "image"
                },
                actual,
                limit,
            },
            other => ExtractError::Decode(other),
        }
    }
}
