pub mod analysis;
pub mod case;
pub mod lawsuit;
pub mod stage;

pub use analysis::{CaseAnalysis, LegalReference, Relevance};
pub use case::{CaseDetails, CaseRecord, DocumentHandle};
pub use lawsuit::{LawsuitDraft, Parties};
pub use stage::Stage;
