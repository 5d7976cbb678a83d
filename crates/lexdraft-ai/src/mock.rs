//! Keyword-driven stand-in for a real analysis backend.
//!
//! Every call sleeps for a fixed latency and then returns canned content.
//! The only input-dependent behaviour is keyword matching on the case
//! explanation, which selects the strong points and the success bucket.

use std::time::Duration;

use async_trait::async_trait;
use lexdraft_core::lawsuit::{join_grounds, standard_facts, standard_relief};
use lexdraft_core::{
    CaseAnalysis, CaseDetails, DocumentHandle, LawsuitDraft, LegalReference, Relevance,
};
use tracing::debug;

use crate::intelligence::{CaseIntelligence, IntelligenceError};

const TERMINATION_KEYWORDS: &[&str] = &["terminat", "fire"];
const DISCRIMINATION_KEYWORDS: &[&str] = &["discriminat"];

/// Simulated processing time per step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockLatency {
    pub analyze: Duration,
    pub references: Duration,
    pub generate: Duration,
}

impl Default for MockLatency {
    fn default() -> Self {
        Self {
            analyze: Duration::from_millis(2000),
            references: Duration::from_millis(1500),
            generate: Duration::from_millis(3000),
        }
    }
}

impl MockLatency {
    pub fn none() -> Self {
        Self {
            analyze: Duration::ZERO,
            references: Duration::ZERO,
            generate: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockIntelligence {
    latency: MockLatency,
}

impl MockIntelligence {
    pub fn new(latency: MockLatency) -> Self {
        Self { latency }
    }

    /// No simulated delay.
    pub fn instant() -> Self {
        Self::new(MockLatency::none())
    }
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

fn mentions_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// Deterministic analysis of an explanation.
///
/// Success buckets: termination and discrimination → 85, termination only
/// → 75, otherwise 65. Matching is case-insensitive on substrings.
pub fn score_case(case_explanation: &str) -> CaseAnalysis {
    let text = case_explanation.to_lowercase();
    let termination = mentions_any(&text, TERMINATION_KEYWORDS);
    let discrimination = mentions_any(&text, DISCRIMINATION_KEYWORDS);

    let strong_points = [
        if termination {
            "Clear violation of termination procedures under Article 67 of Kosovo Labor Law"
        } else {
            "Valid employment relationship documented"
        },
        if discrimination {
            "Evidence of discriminatory treatment"
        } else {
            "Proper documentation available"
        },
        "Witness testimonies support your case",
    ];

    let success_probability = match (termination, discrimination) {
        (true, true) => 85,
        (true, false) => 75,
        _ => 65,
    };

    CaseAnalysis {
        strong_points: to_strings(&strong_points),
        weak_points: to_strings(&[
            "Some documentation may need additional verification",
            "Timeline of events needs clarification",
            "Employer's defense arguments need to be anticipated",
        ]),
        recommendations: to_strings(&[
            "Gather additional witness statements",
            "Collect all relevant employment records",
            "Document all damages and financial losses",
            "Consider mediation before proceeding to court",
        ]),
        legal_grounds: to_strings(&[
            "Article 67 - Termination Procedures (Kosovo Labor Law)",
            "Article 24 - Equal Treatment (Kosovo Labor Law)",
            "Article 78 - Compensation for Damages (Kosovo Labor Law)",
        ]),
        success_probability,
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn reference(article: &str, title: &str, content: &str, relevance: Relevance) -> LegalReference {
    LegalReference {
        article: article.into(),
        title: title.into(),
        content: content.into(),
        relevance,
    }
}

fn standard_references() -> Vec<LegalReference> {
    vec![
        reference(
            "Article 67",
            "Termination of Employment Contract",
            "The employer may terminate the employment contract only for justified reasons specified in this law, with proper notice period and following due process procedures.",
            Relevance::High,
        ),
        reference(
            "Article 24",
            "Principle of Equal Treatment",
            "All employees have the right to equal treatment regardless of race, color, sex, language, religion, political opinion, national origin, social origin, age, or disability.",
            Relevance::High,
        ),
        reference(
            "Article 78",
            "Compensation for Damages",
            "An employee who suffers damages due to unlawful termination is entitled to compensation including lost wages, benefits, and additional damages.",
            Relevance::Medium,
        ),
        reference(
            "Article 45",
            "Notice Period Requirements",
            "Minimum notice periods must be observed: 15 days for employment up to 6 months, 30 days for employment from 6 months to 2 years, 45 days for employment over 2 years.",
            Relevance::Medium,
        ),
    ]
}

#[async_trait]
impl CaseIntelligence for MockIntelligence {
    async fn analyze(
        &self,
        case_explanation: &str,
        documents: &[DocumentHandle],
        _details: &CaseDetails,
    ) -> Result<CaseAnalysis, IntelligenceError> {
        pause(self.latency.analyze).await;
        let analysis = score_case(case_explanation);
        debug!(
            documents = documents.len(),
            success_probability = analysis.success_probability,
            "mock analysis complete"
        );
        Ok(analysis)
    }

    async fn get_references(
        &self,
        _analysis: &CaseAnalysis,
    ) -> Result<Vec<LegalReference>, IntelligenceError> {
        pause(self.latency.references).await;
        Ok(standard_references())
    }

    async fn generate_lawsuit(
        &self,
        details: &CaseDetails,
        analysis: &CaseAnalysis,
        _references: &[LegalReference],
    ) -> Result<LawsuitDraft, IntelligenceError> {
        pause(self.latency.generate).await;
        Ok(LawsuitDraft::assemble(
            details,
            standard_facts(&details.case_explanation),
            join_grounds(&analysis.legal_grounds),
            standard_relief(),
        ))
    }
}
