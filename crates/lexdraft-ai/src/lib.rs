//! Case intelligence: the analyze / reference / generate capability behind
//! the intake stages, with a keyword-driven mock and a chat-model backend.

mod intelligence;
mod llm;
mod mock;

pub use intelligence::{CaseIntelligence, IntelligenceError};
pub use llm::ChatIntelligence;
pub use mock::{MockIntelligence, MockLatency, score_case};
