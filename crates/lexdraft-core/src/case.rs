//! The case record accumulated by the intake wizard.
//!
//! User-supplied fields live in [`CaseDetails`] and may be edited at any
//! time. The derived fields on [`CaseRecord`] are produced by the
//! processing stages and are only ever set once per case.

use serde::{Deserialize, Serialize};

use crate::analysis::{CaseAnalysis, LegalReference};
use crate::lawsuit::LawsuitDraft;

/// An attached file. Only the metadata travels with the case; the bytes
/// stay wherever the caller keeps them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentHandle {
    pub name: String,
    pub size_bytes: u64,
    pub media_type: Option<String>,
}

impl DocumentHandle {
    pub fn new(name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            media_type: None,
        }
    }

    /// Size in megabytes, as shown next to uploaded documents.
    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / 1024.0 / 1024.0
    }
}

/// Caller-supplied case fields. Nothing here is validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseDetails {
    pub title: String,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: String,
    pub description: String,
    /// Attachments in upload order.
    #[serde(default)]
    pub documents: Vec<DocumentHandle>,
    pub case_explanation: String,
}

impl CaseDetails {
    /// Append a document to the end of the list.
    pub fn attach(&mut self, document: DocumentHandle) {
        self.documents.push(document);
    }

    /// Remove the document at `index`, preserving the order of the rest.
    pub fn detach(&mut self, index: usize) -> Option<DocumentHandle> {
        (index < self.documents.len()).then(|| self.documents.remove(index))
    }
}

/// Snapshot of a case: the details plus whatever the stages have produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseRecord {
    #[serde(flatten)]
    pub details: CaseDetails,
    pub analysis: Option<CaseAnalysis>,
    pub references: Option<Vec<LegalReference>>,
    pub lawsuit: Option<LawsuitDraft>,
}

impl CaseRecord {
    pub fn new(details: CaseDetails) -> Self {
        Self {
            details,
            ..Self::default()
        }
    }

    pub fn is_complete(&self) -> bool {
        self.analysis.is_some() && self.references.is_some() && self.lawsuit.is_some()
    }
}
