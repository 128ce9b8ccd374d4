/// Progress of one extraction job.
///
/// `progress` is monotonic within a job. A zone-sequence job restarts at 0 for each zone.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractionProgress {
    /// Human-readable phase label.
    pub status: String,
    /// Percent, 0..=100.
    pub progress: u8,
}

impl ExtractionProgress {
    pub fn new(status: impl Into<String>, progress: u8) -> Self {
        Self {
            status: status.into(),
            progress: progress.min(100),
        }
    }

    /// Build from a fractional service progress (0..=1), rounding to the nearest percent.
    pub fn from_fraction(status: impl Into<String>, fraction: f32) -> Self {
        let percent = if fraction.is_nan() {
            0.0
        } else {
            (fraction.clamp(0.0, 1.0) * 100.0).round()
        };
        Self::new(status, percent as u8)
    }
}

/// Which entry point a job was started through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    /// Text layer of a PDF document.
    Document,
    /// Recognition over the whole image.
    WholeImage,
    /// Recognition over each registered zone, in order.
    Zones,
}

/// Extraction lifecycle phase.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    /// No extraction in flight.
    #[default]
    Idle,
    /// A job has been started and will settle asynchronously.
    Running { kind: JobKind },
}

/// Minimal extraction model: at most one job in flight.
#[derive(Debug, Default)]
pub struct Model {
    phase: Phase,
}

impl Model {
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Running { .. })
    }

    pub fn running_kind(&self) -> Option<JobKind> {
        match self.phase {
            Phase::Running { kind, .. } => Some(kind),
            Phase::Idle => None,
        }
    }

    pub fn start(&mut self, kind: JobKind) {
        self.phase = Phase::Running { kind };
    }

    pub fn finish(&mut self) {
        self.phase = Phase::Idle;
    }
}
