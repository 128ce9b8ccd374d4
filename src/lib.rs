//! scanzone host: wires the core session model to the extraction engine.

pub mod command;
pub mod error;
pub mod input;
pub mod observability;
pub mod session;

pub use command::{Command, Notice, command_from_effect, commands_from_effects};
pub use error::{AppError, AppResult};
pub use input::FileKind;
pub use session::{Session, SessionConfig};
