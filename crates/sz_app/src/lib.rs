use sz_geometry::DEFAULT_MIN_ZONE_SIZE;

pub mod accumulator;
pub mod extraction;
pub mod zones;

pub use accumulator::{AppendOutcome, SubmitError, append, submission_text};
pub use extraction::{ExtractionProgress, JobKind};
pub use zones::{RegisteredZone, ZoneId, ZoneRegistry};

/// Natural pixel size of the loaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// Why an extraction request was refused before any service call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    /// Image extraction requested but no image is loaded (or it is not decoded yet).
    NoImage,
    /// Zone extraction requested with an empty registry.
    NoZones,
}

/// Top-level application actions.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A new image was decoded. Replaces the previous one and clears all zones.
    LoadImage { width: u32, height: u32 },
    /// The image was dropped (e.g. the user switched to a PDF).
    UnloadImage,
    Zone(zones::Action),
    /// The user edited the buffer by hand.
    EditBuffer { text: String },
    /// Extract the text layer of the selected document.
    ExtractDocument,
    /// Recognize the whole image.
    ExtractWholeImage,
    /// Recognize each registered zone in order.
    ExtractZones,
    /// Progress report from the running job.
    ExtractionProgressed(ExtractionProgress),
    /// The running job settled with (possibly empty) text.
    ExtractionCompleted { text: String },
    /// The running job failed.
    ExtractionFailed { message: String },
    /// Back to an empty session.
    Reset,
}

/// Top-level application effects.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Zone(zones::Effect),
    /// Start a document text-layer job.
    StartDocumentExtraction,
    /// Start a whole-image recognition job.
    StartWholeImageExtraction,
    /// Start a zone-sequence job over this snapshot of the registry.
    StartZoneExtraction { zones: Vec<RegisteredZone> },
    /// Show job progress.
    ShowProgress(ExtractionProgress),
    /// The buffer has new contents.
    BufferChanged { text: String },
    /// The job succeeded but found no text.
    ShowNoTextMessage,
    /// The request was refused before starting.
    ShowPrecondition(Precondition),
    /// The job failed; nothing was merged.
    ShowError { message: String },
}

/// Core app model.
#[derive(Debug)]
pub struct AppModel {
    image: Option<ImageSize>,
    zones: zones::Model,
    extraction: extraction::Model,
    buffer: String,
}

impl Default for AppModel {
    fn default() -> Self {
        Self::with_min_zone_size(DEFAULT_MIN_ZONE_SIZE)
    }
}

impl AppModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_zone_size(min_zone_size: f32) -> Self {
        Self {
            image: None,
            zones: zones::Model::with_min_size(min_zone_size),
            extraction: extraction::Model::default(),
            buffer: String::new(),
        }
    }

    pub fn image(&self) -> Option<ImageSize> {
        self.image
    }

    pub fn zones(&self) -> &zones::Model {
        &self.zones
    }

    pub fn extraction(&self) -> &extraction::Model {
        &self.extraction
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn reduce(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::LoadImage { width, height } => {
                // Zones only reference the image by size, so a new image invalidates them.
                self.zones.reset();
                self.image = if width == 0 || height == 0 {
                    None
                } else {
                    Some(ImageSize { width, height })
                };
                vec![Effect::Zone(zones::Effect::ZonesCleared)]
            }

            Action::UnloadImage => {
                self.zones.reset();
                self.image = None;
                vec![Effect::Zone(zones::Effect::ZonesCleared)]
            }

            Action::Zone(a) => {
                // The registry is frozen while a job iterates it.
                if self.extraction.is_running() || self.image.is_none() {
                    return Vec::new();
                }
                self.zones.reduce(a).into_iter().map(Effect::Zone).collect()
            }

            Action::EditBuffer { text } => {
                self.buffer = text;
                Vec::new()
            }

            Action::ExtractDocument => {
                if self.extraction.is_running() {
                    return Vec::new();
                }
                self.extraction.start(JobKind::Document);
                vec![Effect::StartDocumentExtraction]
            }

            Action::ExtractWholeImage => {
                if self.extraction.is_running() {
                    return Vec::new();
                }
                if self.image.is_none() {
                    return vec![Effect::ShowPrecondition(Precondition::NoImage)];
                }
                self.extraction.start(JobKind::WholeImage);
                vec![Effect::StartWholeImageExtraction]
            }

            Action::ExtractZones => {
                if self.extraction.is_running() {
                    return Vec::new();
                }
                if self.image.is_none() {
                    return vec![Effect::ShowPrecondition(Precondition::NoImage)];
                }
                if self.zones.registry().is_empty() {
                    return vec![Effect::ShowPrecondition(Precondition::NoZones)];
                }
                self.extraction.start(JobKind::Zones);
                vec![Effect::StartZoneExtraction {
                    zones: self.zones.registry().zones().to_vec(),
                }]
            }

            Action::ExtractionProgressed(progress) => {
                if self.extraction.is_running() {
                    vec![Effect::ShowProgress(progress)]
                } else {
                    Vec::new()
                }
            }

            Action::ExtractionCompleted { text } => {
                if !self.extraction.is_running() {
                    return Vec::new();
                }
                self.extraction.finish();

                match append(&self.buffer, &text) {
                    AppendOutcome::NothingExtracted => vec![Effect::ShowNoTextMessage],
                    AppendOutcome::Appended(buffer) => {
                        self.buffer = buffer;
                        vec![Effect::BufferChanged {
                            text: self.buffer.clone(),
                        }]
                    }
                }
            }

            Action::ExtractionFailed { message } => {
                if !self.extraction.is_running() {
                    return Vec::new();
                }
                self.extraction.finish();
                vec![Effect::ShowError { message }]
            }

            Action::Reset => {
                let min_size = self.zones.registry().min_size();
                *self = Self::with_min_zone_size(min_size);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use sz_geometry::PercentPoint;

    use super::*;

    fn draw_zone(m: &mut AppModel, from: (f32, f32), to: (f32, f32)) -> Vec<Effect> {
        m.reduce(Action::Zone(zones::Action::PointerDown {
            point: PercentPoint::new(from.0, from.1),
        }));
        m.reduce(Action::Zone(zones::Action::PointerUp {
            point: PercentPoint::new(to.0, to.1),
        }))
    }

    #[test]
    fn extract_zones_snapshots_registry_and_ignores_reentry() {
        let mut m = AppModel::new();
        m.reduce(Action::LoadImage {
            width: 800,
            height: 600,
        });
        draw_zone(&mut m, (0.0, 0.0), (50.0, 50.0));
        draw_zone(&mut m, (50.0, 50.0), (100.0, 100.0));

        let eff = m.reduce(Action::ExtractZones);
        let zones = m.zones().registry().zones().to_vec();
        assert_eq!(eff, vec![Effect::StartZoneExtraction { zones }]);
        assert_eq!(m.extraction().running_kind(), Some(JobKind::Zones));

        // Re-entrant requests are ignored while running.
        assert!(m.reduce(Action::ExtractZones).is_empty());
        assert!(m.reduce(Action::ExtractWholeImage).is_empty());
        assert!(m.reduce(Action::ExtractDocument).is_empty());
    }

    #[test]
    fn registry_is_frozen_while_running() {
        let mut m = AppModel::new();
        m.reduce(Action::LoadImage {
            width: 100,
            height: 100,
        });
        draw_zone(&mut m, (0.0, 0.0), (50.0, 50.0));
        let _ = m.reduce(Action::ExtractZones);

        let eff = draw_zone(&mut m, (60.0, 60.0), (90.0, 90.0));
        assert!(eff.is_empty());
        assert!(m.reduce(Action::Zone(zones::Action::ClearZones)).is_empty());
        assert_eq!(m.zones().registry().len(), 1);
    }

    #[test]
    fn image_preconditions_are_reported() {
        let mut m = AppModel::new();
        assert_eq!(
            m.reduce(Action::ExtractWholeImage),
            vec![Effect::ShowPrecondition(Precondition::NoImage)]
        );

        m.reduce(Action::LoadImage {
            width: 100,
            height: 100,
        });
        assert_eq!(
            m.reduce(Action::ExtractZones),
            vec![Effect::ShowPrecondition(Precondition::NoZones)]
        );
        assert!(!m.extraction().is_running());
    }

    #[test]
    fn undecoded_image_counts_as_no_image() {
        let mut m = AppModel::new();
        m.reduce(Action::LoadImage {
            width: 0,
            height: 100,
        });
        assert_eq!(m.image(), None);
        assert_eq!(
            m.reduce(Action::ExtractWholeImage),
            vec![Effect::ShowPrecondition(Precondition::NoImage)]
        );
    }

    #[test]
    fn replacing_image_clears_zones() {
        let mut m = AppModel::new();
        m.reduce(Action::LoadImage {
            width: 100,
            height: 100,
        });
        draw_zone(&mut m, (0.0, 0.0), (50.0, 50.0));
        assert_eq!(m.zones().registry().len(), 1);

        m.reduce(Action::LoadImage {
            width: 200,
            height: 100,
        });
        assert!(m.zones().registry().is_empty());
    }

    #[test]
    fn completed_text_is_merged_after_manual_edits() {
        let mut m = AppModel::new();
        m.reduce(Action::EditBuffer {
            text: "typed first\n".to_string(),
        });

        let _ = m.reduce(Action::ExtractDocument);
        let eff = m.reduce(Action::ExtractionCompleted {
            text: "page text".to_string(),
        });

        assert_eq!(m.buffer(), "typed first\n\npage text");
        assert_eq!(
            eff,
            vec![Effect::BufferChanged {
                text: "typed first\n\npage text".to_string(),
            }]
        );
        assert!(!m.extraction().is_running());
    }

    #[test]
    fn empty_result_shows_message_and_keeps_buffer() {
        let mut m = AppModel::new();
        m.reduce(Action::EditBuffer {
            text: "keep me".to_string(),
        });
        let _ = m.reduce(Action::ExtractDocument);

        let eff = m.reduce(Action::ExtractionCompleted {
            text: String::new(),
        });
        assert_eq!(eff, vec![Effect::ShowNoTextMessage]);
        assert_eq!(m.buffer(), "keep me");
    }

    #[test]
    fn failure_resets_phase_without_touching_buffer() {
        let mut m = AppModel::new();
        let _ = m.reduce(Action::ExtractDocument);
        let eff = m.reduce(Action::ExtractionFailed {
            message: "boom".to_string(),
        });

        assert_eq!(
            eff,
            vec![Effect::ShowError {
                message: "boom".to_string(),
            }]
        );
        assert_eq!(m.buffer(), "");
        assert!(!m.extraction().is_running());
    }

    #[test]
    fn progress_is_forwarded_only_while_running() {
        let mut m = AppModel::new();
        let p = ExtractionProgress::new("Reading page 1/2", 50);
        assert!(m.reduce(Action::ExtractionProgressed(p.clone())).is_empty());

        let _ = m.reduce(Action::ExtractDocument);
        assert_eq!(
            m.reduce(Action::ExtractionProgressed(p.clone())),
            vec![Effect::ShowProgress(p)]
        );
    }

    #[test]
    fn stale_completion_is_ignored() {
        let mut m = AppModel::new();
        assert!(
            m.reduce(Action::ExtractionCompleted {
                text: "late".to_string(),
            })
            .is_empty()
        );
        assert_eq!(m.buffer(), "");
    }
}
