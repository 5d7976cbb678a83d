use lexdraft_ai::IntelligenceError;
use lexdraft_core::Stage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WizardError {
    #[error("processing failed at the {stage} stage: {cause}")]
    ProcessingFailed {
        stage: Stage,
        #[source]
        cause: IntelligenceError,
    },
    #[error("processing for the {0} stage is still in flight")]
    Busy(Stage),
    #[error("result for the {0} stage was discarded after navigating away")]
    Superseded(Stage),
    #[error("the {0} stage needs the output of an earlier stage")]
    MissingPrerequisite(Stage),
}
