//! Outputs of the analyze and reference stages.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Assessment of a case produced once by the analyze stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseAnalysis {
    pub strong_points: Vec<String>,
    pub weak_points: Vec<String>,
    pub recommendations: Vec<String>,
    pub legal_grounds: Vec<String>,
    /// Integer percentage, 0–100.
    pub success_probability: u8,
}

/// Qualitative ranking attached to a legal reference.
///
/// Ordered so that `High < Medium < Low`, i.e. an ascending sort puts the
/// most relevant references first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relevance {
    High,
    Medium,
    Low,
}

impl Relevance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Relevance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown relevance tier: {0:?}")]
pub struct UnknownRelevance(pub String);

impl FromStr for Relevance {
    type Err = UnknownRelevance;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(UnknownRelevance(s.to_string())),
        }
    }
}

/// A statute article cited in support of the case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalReference {
    pub article: String,
    pub title: String,
    pub content: String,
    pub relevance: Relevance,
}

/// References at exactly the given tier, in their original order.
pub fn with_relevance(references: &[LegalReference], tier: Relevance) -> Vec<&LegalReference> {
    references.iter().filter(|r| r.relevance == tier).collect()
}

/// Stable sort, most relevant first.
pub fn sort_by_relevance(references: &mut [LegalReference]) {
    references.sort_by_key(|r| r.relevance);
}
