//! Document and image to text extraction.
//!
//! The engine drives two external services through [`DocumentParser`] and
//! [`Recognizer`]; it never blocks on its own and never touches UI state.

pub mod engine;
pub mod error;
pub mod progress;
pub mod raster;
pub mod service;

pub use engine::{EngineLimits, ExtractedText, ExtractionEngine, join_fragments};
pub use error::{ErrorKind, ExtractError};
pub use progress::{NoProgress, ProgressSink, ServiceProgress, ServiceProgressSink};
pub use raster::{ImageLimits, RasterError, SourceImage, rasterize};
pub use service::{
    DocumentParser, LanguagePair, ParseLanguagePairError, ParsedDocument, Recognizer,
    ServiceError, TextFragment,
};
