use chrono::{DateTime, Utc};
use lexdraft_core::{CaseRecord, Stage};

/// Notifications published by the wizard for whoever renders it.
#[derive(Debug, Clone)]
pub enum WizardEvent {
    StageEntered(Stage),
    /// The processing step attached to `Stage` stored its output.
    OutputReady(Stage),
    ProcessingFailed { stage: Stage, cause: String },
    /// Advanced past the last stage.
    Submitted {
        record: Box<CaseRecord>,
        submitted_at: DateTime<Utc>,
    },
    /// Retreated from the first stage.
    Exited,
}
