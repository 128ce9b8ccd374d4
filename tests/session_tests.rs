use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, RgbaImage};
use scanzone::{AppError, Notice, Session, SessionConfig};
use sz_app::{Action, Precondition};
use sz_extract::{
    DocumentParser, ExtractionEngine, ImageLimits, LanguagePair, ParsedDocument, Recognizer,
    ServiceError, ServiceProgress, ServiceProgressSink, TextFragment,
};
use sz_geometry::NormalizedZone;

struct StaticParser {
    pages: Vec<&'static str>,
}

struct StaticDocument {
    pages: Vec<&'static str>,
}

#[async_trait]
impl DocumentParser for StaticParser {
    async fn open(&self, _bytes: &[u8]) -> Result<Box<dyn ParsedDocument>, ServiceError> {
        Ok(Box::new(StaticDocument {
            pages: self.pages.clone(),
        }))
    }
}

#[async_trait]
impl ParsedDocument for StaticDocument {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    async fn page_fragments(&self, page: u32) -> Result<Vec<TextFragment>, ServiceError> {
        Ok(self.pages[(page - 1) as usize]
            .split_whitespace()
            .map(TextFragment::new)
            .collect())
    }
}

struct QueueRecognizer {
    results: Mutex<VecDeque<Result<&'static str, &'static str>>>,
    calls: AtomicUsize,
}

#[async_trait]
impl Recognizer for QueueRecognizer {
    async fn recognize(
        &self,
        _image: &DynamicImage,
        _languages: &LanguagePair,
        progress: &mut dyn ServiceProgressSink,
    ) -> Result<String, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        progress.report(ServiceProgress::new("recognizing text", 0.5));
        match self.results.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text.to_string()),
            Some(Err(msg)) => Err(ServiceError::Failed(msg.to_string())),
            None => Ok(String::new()),
        }
    }
}

fn session_with(
    pages: Vec<&'static str>,
    results: Vec<Result<&'static str, &'static str>>,
) -> (Session, Arc<QueueRecognizer>) {
    let recognizer = Arc::new(QueueRecognizer {
        results: Mutex::new(results.into()),
        calls: AtomicUsize::new(0),
    });
    let engine = ExtractionEngine::new(
        Arc::new(StaticParser { pages }),
        Arc::clone(&recognizer) as Arc<dyn Recognizer>,
        LanguagePair::default(),
    );
    (Session::new(engine, SessionConfig::default()), recognizer)
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(RgbaImage::new(width, height))
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn buffer_changes(notices: &[Notice]) -> Vec<&str> {
    notices
        .iter()
        .filter_map(|n| match n {
            Notice::BufferChanged { text } => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn zone_job_labels_areas_and_fills_buffer() {
    let (mut session, recognizer) = session_with(vec![], vec![Ok("alpha"), Ok("beta")]);
    session.load_image(&png(200, 100)).unwrap();
    session.add_zone(&NormalizedZone::new(0.0, 0.0, 50.0, 50.0));
    session.add_zone(&NormalizedZone::new(50.0, 50.0, 50.0, 50.0));

    let notices = session.dispatch(Action::ExtractZones).await;

    assert_eq!(buffer_changes(&notices), vec!["Area 1: alpha\n\nArea 2: beta"]);
    assert_eq!(session.buffer(), "Area 1: alpha\n\nArea 2: beta");
    assert!(notices.iter().any(|n| matches!(n, Notice::Progress(p) if p.status == "Area 2/2: recognizing text")));
    assert_eq!(recognizer.calls.load(Ordering::SeqCst), 2);
    assert!(!session.model().extraction().is_running());
}

#[tokio::test]
async fn results_accumulate_after_manual_edits() {
    let (mut session, _) = session_with(vec![], vec![Ok("  scanned  ")]);
    session.load_image(&png(10, 10)).unwrap();
    session.set_buffer("typed by hand\n");

    session.dispatch(Action::ExtractWholeImage).await;
    assert_eq!(session.buffer(), "typed by hand\n\nscanned");
}

#[tokio::test]
async fn empty_result_leaves_buffer_untouched() {
    let (mut session, _) = session_with(vec![], vec![Ok("   ")]);
    session.load_image(&png(10, 10)).unwrap();
    session.set_buffer("keep me");

    let notices = session.dispatch(Action::ExtractWholeImage).await;
    assert!(notices.contains(&Notice::NoText));
    assert_eq!(session.buffer(), "keep me");
}

#[tokio::test]
async fn service_failure_reports_error_and_allows_retry() {
    let (mut session, _) = session_with(vec![], vec![Err("engine crashed"), Ok("second try")]);
    session.load_image(&png(10, 10)).unwrap();

    let notices = session.dispatch(Action::ExtractWholeImage).await;
    assert!(notices.iter().any(|n| matches!(n, Notice::Error { message } if message.contains("engine crashed"))));
    assert_eq!(session.buffer(), "");

    session.dispatch(Action::ExtractWholeImage).await;
    assert_eq!(session.buffer(), "second try");
}

#[tokio::test]
async fn zone_failure_discards_earlier_zones() {
    let (mut session, _) = session_with(vec![], vec![Ok("first"), Err("timeout")]);
    session.load_image(&png(100, 100)).unwrap();
    session.add_zone(&NormalizedZone::new(0.0, 0.0, 40.0, 40.0));
    session.add_zone(&NormalizedZone::new(50.0, 50.0, 40.0, 40.0));

    let notices = session.dispatch(Action::ExtractZones).await;
    assert!(buffer_changes(&notices).is_empty());
    assert_eq!(session.buffer(), "");
}

#[tokio::test]
async fn zones_required_before_zone_job() {
    let (mut session, recognizer) = session_with(vec![], vec![Ok("x")]);
    session.load_image(&png(10, 10)).unwrap();

    let notices = session.dispatch(Action::ExtractZones).await;
    assert_eq!(notices, vec![Notice::Precondition(Precondition::NoZones)]);
    assert_eq!(recognizer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn tiny_zones_are_discarded() {
    let (mut session, _) = session_with(vec![], vec![]);
    session.load_image(&png(10, 10)).unwrap();

    let notices = session.add_zone(&NormalizedZone::new(10.0, 10.0, 0.5, 30.0));
    assert!(notices.is_empty());
    assert!(session.model().zones().registry().is_empty());
}

#[tokio::test]
async fn document_job_joins_pages() {
    let (mut session, recognizer) = session_with(vec!["Hello   world", "", "last page"], vec![]);
    session.load_document(b"%PDF-1.7".to_vec());

    let notices = session.dispatch(Action::ExtractDocument).await;

    assert_eq!(session.buffer(), "Hello world\n\n\n\nlast page");
    let progress: Vec<u8> = notices
        .iter()
        .filter_map(|n| match n {
            Notice::Progress(p) => Some(p.progress),
            _ => None,
        })
        .collect();
    assert_eq!(progress, vec![33, 67, 100]);
    assert_eq!(recognizer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn document_job_without_document_is_rejected() {
    let (mut session, _) = session_with(vec!["text"], vec![]);

    let notices = session.dispatch(Action::ExtractDocument).await;
    assert!(notices.iter().any(|n| matches!(n, Notice::Rejected { .. })));
    assert!(!session.model().extraction().is_running());
}

#[test]
fn oversized_image_is_a_user_error() {
    let recognizer = Arc::new(QueueRecognizer {
        results: Mutex::new(VecDeque::new()),
        calls: AtomicUsize::new(0),
    });
    let engine = ExtractionEngine::new(
        Arc::new(StaticParser { pages: vec![] }),
        recognizer,
        LanguagePair::default(),
    );
    let config = SessionConfig {
        image_limits: ImageLimits {
            max_bytes: 16,
            max_pixels: 1_000,
        },
        ..SessionConfig::default()
    };
    let mut session = Session::new(engine, config);

    let err = session.load_image(&png(10, 10)).unwrap_err();
    assert!(matches!(err, AppError::Extract(_)));
    assert!(err.is_user_error());
    assert!(session.image().is_none());
}

#[test]
fn submission_requires_minimum_length() {
    let (mut session, _) = session_with(vec![], vec![]);
    session.set_buffer("  short ");
    assert!(matches!(session.submission(), Err(AppError::Submit(_))));

    session.set_buffer("  long enough to analyze  ");
    assert_eq!(session.submission().unwrap(), "long enough to analyze");
}
