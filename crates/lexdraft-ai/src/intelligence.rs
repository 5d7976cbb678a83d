use std::sync::Arc;

use async_trait::async_trait;
use lexdraft_chat::ChatError;
use lexdraft_core::{CaseAnalysis, CaseDetails, DocumentHandle, LawsuitDraft, LegalReference};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IntelligenceError {
    #[error(transparent)]
    Chat(#[from] ChatError),
    #[error("model response did not match the expected shape: {0}")]
    InvalidResponse(String),
}

/// The three processing steps of the intake pipeline.
///
/// Implementations may be slow but are expected to be deterministic for
/// identical inputs where the backend allows it.
#[async_trait]
pub trait CaseIntelligence: Send + Sync {
    /// Assess the case from its explanation and attached documents.
    async fn analyze(
        &self,
        case_explanation: &str,
        documents: &[DocumentHandle],
        details: &CaseDetails,
    ) -> Result<CaseAnalysis, IntelligenceError>;

    /// Statute references supporting `analysis`. Never empty on success.
    async fn get_references(
        &self,
        analysis: &CaseAnalysis,
    ) -> Result<Vec<LegalReference>, IntelligenceError>;

    /// Draft the lawsuit. `full_text` is the final rendered document.
    async fn generate_lawsuit(
        &self,
        details: &CaseDetails,
        analysis: &CaseAnalysis,
        references: &[LegalReference],
    ) -> Result<LawsuitDraft, IntelligenceError>;
}

#[async_trait]
impl<T: CaseIntelligence + ?Sized> CaseIntelligence for Arc<T> {
    async fn analyze(
        &self,
        case_explanation: &str,
        documents: &[DocumentHandle],
        details: &CaseDetails,
    ) -> Result<CaseAnalysis, IntelligenceError> {
        (**self).analyze(case_explanation, documents, details).await
    }

    async fn get_references(
        &self,
        analysis: &CaseAnalysis,
    ) -> Result<Vec<LegalReference>, IntelligenceError> {
        (**self).get_references(analysis).await
    }

    async fn generate_lawsuit(
        &self,
        details: &CaseDetails,
        analysis: &CaseAnalysis,
        references: &[LegalReference],
    ) -> Result<LawsuitDraft, IntelligenceError> {
        (**self).generate_lawsuit(details, analysis, references).await
    }
}

#[async_trait]
impl<T: CaseIntelligence + ?Sized> CaseIntelligence for Box<T> {
    async fn analyze(
        &self,
        case_explanation: &str,
        documents: &[DocumentHandle],
        details: &CaseDetails,
    ) -> Result<CaseAnalysis, IntelligenceError> {
        (**self).analyze(case_explanation, documents, details).await
    }

    async fn get_references(
        &self,
        analysis: &CaseAnalysis,
    ) -> Result<Vec<LegalReference>, IntelligenceError> {
        (**self).get_references(analysis).await
    }

    async fn generate_lawsuit(
        &self,
        details: &CaseDetails,
        analysis: &CaseAnalysis,
        references: &[LegalReference],
    ) -> Result<LawsuitDraft, IntelligenceError> {
        (**self).generate_lawsuit(details, analysis, references).await
    }
}
