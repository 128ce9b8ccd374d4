use std::collections::VecDeque;

use sz_app::{Action, AppModel, ExtractionProgress, ZoneId, submission_text, zones};
use sz_extract::{
    EngineLimits, ExtractError, ExtractionEngine, ImageLimits, LanguagePair, SourceImage,
};
use sz_geometry::{NormalizedZone, PercentPoint};
use sz_settings::Settings;
use tracing::{debug, info, warn};

use crate::command::{Command, Notice, commands_from_effects};
use crate::error::{AppError, AppResult};

/// Session knobs taken from settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub languages: LanguagePair,
    pub image_limits: ImageLimits,
    pub engine_limits: EngineLimits,
    pub min_zone_size: f32,
    pub min_submit_chars: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            languages: LanguagePair::default(),
            image_limits: ImageLimits::default(),
            engine_limits: EngineLimits::default(),
            min_zone_size: sz_geometry::DEFAULT_MIN_ZONE_SIZE,
            min_submit_chars: sz_app::accumulator::DEFAULT_MIN_SUBMIT_CHARS,
        }
    }
}

impl SessionConfig {
    pub fn from_settings(settings: &Settings) -> AppResult<Self> {
        let languages = settings
            .ocr_languages
            .parse::<LanguagePair>()
            .map_err(|e| AppError::Config(e.to_string()))?;

        Ok(Self {
            languages,
            image_limits: ImageLimits {
                max_bytes: settings.max_image_bytes,
                max_pixels: settings.max_image_pixels,
            },
            engine_limits: EngineLimits {
                max_document_bytes: settings.max_document_bytes,
                max_recognition_pixels: settings.max_image_pixels,
            },
            min_zone_size: settings.min_zone_size,
            min_submit_chars: settings.min_submit_chars,
        })
    }
}

enum Job {
    Document,
    WholeImage,
    Zones(Vec<sz_app::RegisteredZone>),
}

/// One user session: core model, loaded input, and the engine that serves its jobs.
///
/// Jobs run to completion inside [`Session::dispatch`]; the model's in-flight guard
/// still drops any extraction request that arrives while one is running.
pub struct Session {
    model: AppModel,
    engine: ExtractionEngine,
    config: SessionConfig,
    image: Option<SourceImage>,
    document: Option<Vec<u8>>,
}

impl Session {
    pub fn new(engine: ExtractionEngine, config: SessionConfig) -> Self {
        Self {
            model: AppModel::with_min_zone_size(config.min_zone_size),
            engine: engine.with_limits(config.engine_limits),
            config,
            image: None,
            document: None,
        }
    }

    pub fn model(&self) -> &AppModel {
        &self.model
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn buffer(&self) -> &str {
        self.model.buffer()
    }

    pub fn image(&self) -> Option<&SourceImage> {
        self.image.as_ref()
    }

    pub fn has_document(&self) -> bool {
        self.document.is_some()
    }

    /// Replace the buffer (manual edit).
    pub fn set_buffer(&mut self, text: impl Into<String>) {
        self.model.reduce(Action::EditBuffer { text: text.into() });
    }

    /// Decode and select an image. Clears zones and any selected document.
    pub fn load_image(&mut self, bytes: &[u8]) -> AppResult<Vec<Notice>> {
        let source = SourceImage::decode(bytes, &self.config.image_limits)
            .map_err(|e| AppError::Extract(e.into()))?;
        info!(
            width = source.natural_width(),
            height = source.natural_height(),
            "image loaded"
        );

        let effects = self.model.reduce(Action::LoadImage {
            width: source.natural_width(),
            height: source.natural_height(),
        });
        self.image = Some(source);
        self.document = None;
        Ok(notices_only(commands_from_effects(effects)))
    }

    /// Select a document. Drops any selected image and its zones.
    pub fn load_document(&mut self, bytes: Vec<u8>) -> Vec<Notice> {
        debug!(bytes = bytes.len(), "document selected");
        let effects = self.model.reduce(Action::UnloadImage);
        self.image = None;
        self.document = Some(bytes);
        notices_only(commands_from_effects(effects))
    }

    /// Register a zone as if it were dragged from its top-left to its bottom-right corner.
    pub fn add_zone(&mut self, zone: &NormalizedZone) -> Vec<Notice> {
        let zone = zone.normalized();
        let press = PercentPoint::new(zone.x, zone.y);
        let release = PercentPoint::new(zone.right(), zone.bottom());

        let mut effects = self
            .model
            .reduce(Action::Zone(zones::Action::PointerDown { point: press }));
        effects.extend(
            self.model
                .reduce(Action::Zone(zones::Action::PointerUp { point: release })),
        );
        notices_only(commands_from_effects(effects))
    }

    pub fn remove_zone(&mut self, id: ZoneId) -> Vec<Notice> {
        let effects = self
            .model
            .reduce(Action::Zone(zones::Action::RemoveZone { id }));
        notices_only(commands_from_effects(effects))
    }

    /// The buffer as it would be sent for analysis.
    pub fn submission(&self) -> AppResult<&str> {
        Ok(submission_text(
            self.model.buffer(),
            self.config.min_submit_chars,
        )?)
    }

    /// Reduce `action` and run every job it starts, feeding results back into the model.
    pub async fn dispatch(&mut self, action: Action) -> Vec<Notice> {
        let mut pending: VecDeque<Command> = commands_from_effects(self.model.reduce(action)).into();
        let mut notices = Vec::new();

        while let Some(command) = pending.pop_front() {
            let job = match command {
                Command::Notify(notice) => {
                    notices.push(notice);
                    continue;
                }
                Command::RunDocumentJob => Job::Document,
                Command::RunWholeImageJob => Job::WholeImage,
                Command::RunZoneJob { zones } => Job::Zones(zones),
            };
            pending.extend(self.run_job(job, &mut notices).await);
        }

        notices
    }

    async fn run_job(&mut self, job: Job, notices: &mut Vec<Notice>) -> Vec<Command> {
        let Session {
            model,
            engine,
            image,
            document,
            ..
        } = self;

        let result = {
            let mut progress = |p: ExtractionProgress| {
                let effects = model.reduce(Action::ExtractionProgressed(p));
                notices.extend(notices_only(commands_from_effects(effects)));
            };

            match (&job, image.as_ref(), document.as_deref()) {
                (Job::Document, _, Some(bytes)) => {
                    engine.extract_document_text(bytes, &mut progress).await
                }
                (Job::Document, _, None) => Err(ExtractError::EmptyDocument),
                (Job::WholeImage, Some(source), _) => {
                    engine.extract_whole_image_text(source, &mut progress).await
                }
                (Job::Zones(zones), Some(source), _) => {
                    engine.extract_zones_text(source, zones, &mut progress).await
                }
                (Job::WholeImage | Job::Zones(_), None, _) => Err(ExtractError::SourceNotReady),
            }
        };

        match result {
            Ok(text) => {
                debug!(chars = text.as_str().len(), "job completed");
                commands_from_effects(model.reduce(Action::ExtractionCompleted {
                    text: text.into_string(),
                }))
            }
            Err(e) => {
                warn!(error = %e, kind = ?e.kind(), "job failed");
                let message = e.to_string();
                let commands = commands_from_effects(model.reduce(Action::ExtractionFailed {
                    message: message.clone(),
                }));
                if !e.is_precondition() {
                    return commands;
                }
                commands
                    .into_iter()
                    .map(|c| match c {
                        Command::Notify(Notice::Error { .. }) => {
                            Command::Notify(Notice::Rejected {
                                message: message.clone(),
                            })
                        }
                        other => other,
                    })
                    .collect()
            }
        }
    }
}

fn notices_only(commands: Vec<Command>) -> Vec<Notice> {
    commands
        .into_iter()
        .filter_map(|c| match c {
            Command::Notify(n) => Some(n),
            _ => None,
        })
        .collect()
}
