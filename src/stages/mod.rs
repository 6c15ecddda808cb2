//! Stage functions of the reply pipeline.
//!
//! Each stage is a function of (record, collaborators) to a [`StageUpdate`].
//! Stages absorb their own provider and generator failures: the failure text
//! lands in the owning field as an `Error:` marker so the supervisor's table
//! can keep advancing. Only the send stage turns a failure terminal.

mod analyze;
mod compose;
mod context;
mod send;

pub use analyze::run_analyze;
pub use compose::run_compose;
pub use context::run_context;
pub use send::run_send;

use crate::generate::TextGenerator;
use crate::providers::{CalendarProvider, MailProvider};

/// The external collaborators one session works against.
pub struct Collaborators<'a> {
    pub mail: &'a dyn MailProvider,
    pub calendar: &'a dyn CalendarProvider,
    pub generator: &'a dyn TextGenerator,
}

/// Error marker recorded in a content field when its stage fails.
/// Non-empty by construction, so the field counts as present.
pub(crate) fn error_marker(err: &anyhow::Error) -> String {
    format!("Error: {:#}", err)
}
