//! Case-intake wizard: walks a case through the fixed stage list and runs
//! the processing step attached to the explain, analyze and reference
//! stages exactly once per case.

mod error;
mod event;
mod sequencer;
mod slot;

pub use error::WizardError;
pub use event::WizardEvent;
pub use sequencer::{Advance, Retreat, Wizard};
pub use slot::{SlotStatus, StageSlot};
