use sz_app::ExtractionProgress;

/// Observer for engine progress.
///
/// Best-effort telemetry: it may fire zero or many times per job and is never
/// a correctness signal.
pub trait ProgressSink: Send {
    fn report(&mut self, progress: ExtractionProgress);
}

impl<F> ProgressSink for F
where
    F: FnMut(ExtractionProgress) + Send,
{
    fn report(&mut self, progress: ExtractionProgress) {
        self(progress)
    }
}

/// Sink for callers without a progress observer.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _progress: ExtractionProgress) {}
}

/// Raw progress callback payload from the recognition service.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceProgress {
    pub status: String,
    /// Fraction, 0..=1.
    pub progress: f32,
}

impl ServiceProgress {
    pub fn new(status: impl Into<String>, progress: f32) -> Self {
        Self {
            status: status.into(),
            progress,
        }
    }
}

/// Callback handed to the recognition service.
pub trait ServiceProgressSink: Send {
    fn report(&mut self, progress: ServiceProgress);
}

impl<F> ServiceProgressSink for F
where
    F: FnMut(ServiceProgress) + Send,
{
    fn report(&mut self, progress: ServiceProgress) {
        self(progress)
    }
}
