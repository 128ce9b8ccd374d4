use sz_app::{Effect, ExtractionProgress, Precondition, RegisteredZone, ZoneId, zones};

/// What the user should be told.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Progress(ExtractionProgress),
    BufferChanged { text: String },
    /// The job succeeded but found nothing; the buffer is unchanged.
    NoText,
    /// Refused by the session model before starting.
    Precondition(Precondition),
    /// Refused by the engine before any service call (too large, undecodable, empty document).
    Rejected { message: String },
    /// A service failed; the buffer is unchanged.
    Error { message: String },
    ZoneAdded { zone: RegisteredZone },
    ZoneRemoved { id: ZoneId },
    ZonesCleared,
}

/// Host-side work requested by the core model.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    RunDocumentJob,
    RunWholeImageJob,
    RunZoneJob { zones: Vec<RegisteredZone> },
    Notify(Notice),
}

pub fn command_from_effect(effect: Effect) -> Option<Command> {
    match effect {
        Effect::Zone(zone) => match zone {
            zones::Effect::ZoneAdded { zone } => Some(Command::Notify(Notice::ZoneAdded { zone })),
            zones::Effect::ZoneRemoved { id } => Some(Command::Notify(Notice::ZoneRemoved { id })),
            zones::Effect::ZonesCleared => Some(Command::Notify(Notice::ZonesCleared)),
            // Accidental clicks are dropped silently.
            zones::Effect::ZoneDiscarded => None,
        },

        Effect::StartDocumentExtraction => Some(Command::RunDocumentJob),
        Effect::StartWholeImageExtraction => Some(Command::RunWholeImageJob),
        Effect::StartZoneExtraction { zones } => Some(Command::RunZoneJob { zones }),
        Effect::ShowProgress(p) => Some(Command::Notify(Notice::Progress(p))),
        Effect::BufferChanged { text } => Some(Command::Notify(Notice::BufferChanged { text })),
        Effect::ShowNoTextMessage => Some(Command::Notify(Notice::NoText)),
        Effect::ShowPrecondition(p) => Some(Command::Notify(Notice::Precondition(p))),
        Effect::ShowError { message } => Some(Command::Notify(Notice::Error { message })),
    }
}

pub fn commands_from_effects(effects: impl IntoIterator<Item = Effect>) -> Vec<Command> {
    effects
        .into_iter()
        .filter_map(command_from_effect)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_effects_become_jobs_and_the_rest_notices() {
        let commands = commands_from_effects([
            Effect::StartWholeImageExtraction,
            Effect::ShowNoTextMessage,
            Effect::Zone(zones::Effect::ZoneDiscarded),
            Effect::ShowPrecondition(Precondition::NoZones),
        ]);
        assert_eq!(
            commands,
            vec![
                Command::RunWholeImageJob,
                Command::Notify(Notice::NoText),
                Command::Notify(Notice::Precondition(Precondition::NoZones)),
            ]
        );
    }
}
