//! [`CaseIntelligence`] backed by the chat-completion service.
//!
//! Each step asks the model for raw JSON and parses it into the pipeline
//! types. The lawsuit document itself is always rendered locally so the
//! plaintiff and the analysis grounds are guaranteed to appear in it.

use async_trait::async_trait;
use lexdraft_chat::{ChatClient, ChatMessage};
use lexdraft_core::lawsuit::{join_grounds, standard_relief};
use lexdraft_core::{
    CaseAnalysis, CaseDetails, DocumentHandle, LawsuitDraft, LegalReference, Relevance,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::intelligence::{CaseIntelligence, IntelligenceError};

// ── Prompt templates ──

const ANALYZE_SYSTEM_PROMPT: &str = "\
You are a Kosovo labor law expert assistant. Assess the employment case you are given.

Respond ONLY with a JSON object. No markdown fences, no explanation, just raw JSON:
{
  \"strongPoints\": [\"...\"],
  \"weakPoints\": [\"...\"],
  \"recommendations\": [\"...\"],
  \"legalGrounds\": [\"Article N - Title (Kosovo Labor Law)\"],
  \"successProbability\": integer percentage from 0 to 100
}";

const REFERENCES_SYSTEM_PROMPT: &str = "\
You are a Kosovo labor law expert assistant. Given the legal grounds of a case, list the statute \
articles that support it, most relevant first.

Respond ONLY with a JSON array. No markdown fences, no explanation, just raw JSON:
[
  {
    \"article\": \"Article N\",
    \"title\": \"short title\",
    \"content\": \"summary of the provision\",
    \"relevance\": \"high\" | \"medium\" | \"low\"
  }
]";

const LAWSUIT_SYSTEM_PROMPT: &str = "\
You are a legal drafter specialising in Kosovo Labor Law. Write the facts section and the relief \
sought for a wrongful termination lawsuit.

Respond ONLY with a JSON object. No markdown fences, no explanation, just raw JSON:
{
  \"facts\": \"the facts section as one paragraph\",
  \"reliefSought\": [\"...\"]
}";

fn build_analyze_prompt(explanation: &str, documents: &[DocumentHandle], details: &CaseDetails) -> String {
    let documents = if documents.is_empty() {
        "none".to_string()
    } else {
        documents
            .iter()
            .map(|d| d.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!(
        "Client: {client}\n\
         Case: {title}\n\
         Summary: {summary}\n\
         Documents: {documents}\n\
         \n\
         Explanation:\n\
         {explanation}",
        client = details.client_name,
        title = details.title,
        summary = details.description,
    )
}

fn build_references_prompt(analysis: &CaseAnalysis) -> String {
    format!("Legal grounds:\n- {}", analysis.legal_grounds.join("\n- "))
}

fn build_lawsuit_prompt(
    details: &CaseDetails,
    analysis: &CaseAnalysis,
    references: &[LegalReference],
) -> String {
    let cited = references
        .iter()
        .map(|r| format!("{} ({}): {}", r.article, r.relevance, r.title))
        .collect::<Vec<_>>()
        .join("\n- ");
    format!(
        "Plaintiff: {client}\n\
         Explanation: {explanation}\n\
         Legal grounds: {grounds}\n\
         Cited articles:\n- {cited}",
        client = details.client_name,
        explanation = details.case_explanation,
        grounds = analysis.legal_grounds.join("; "),
    )
}

// ── Response shapes ──

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisReply {
    #[serde(default)]
    strong_points: Vec<String>,
    #[serde(default)]
    weak_points: Vec<String>,
    #[serde(default)]
    recommendations: Vec<String>,
    legal_grounds: Vec<String>,
    success_probability: f64,
}

#[derive(Deserialize)]
struct ReferenceReply {
    article: String,
    title: String,
    content: String,
    relevance: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LawsuitReply {
    facts: String,
    #[serde(default)]
    relief_sought: Vec<String>,
}

/// Strip an optional markdown code fence around a JSON payload.
fn unfence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.trim_end();
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    // Language tag, if any. Payloads are objects or arrays so never start
    // with a letter.
    rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()).trim()
}

fn parse_reply<T: DeserializeOwned>(text: &str) -> Result<T, IntelligenceError> {
    serde_json::from_str(unfence(text)).map_err(|e| {
        let preview: String = text.chars().take(200).collect();
        IntelligenceError::InvalidResponse(format!("{e}\nraw: {preview}"))
    })
}

pub struct ChatIntelligence {
    client: ChatClient,
}

impl ChatIntelligence {
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }

    async fn ask(&self, system: &str, user: String) -> Result<String, IntelligenceError> {
        let reply = self
            .client
            .chat(&[ChatMessage::system(system), ChatMessage::user(user)])
            .await?;
        Ok(reply)
    }
}

#[async_trait]
impl CaseIntelligence for ChatIntelligence {
    async fn analyze(
        &self,
        case_explanation: &str,
        documents: &[DocumentHandle],
        details: &CaseDetails,
    ) -> Result<CaseAnalysis, IntelligenceError> {
        let reply = self
            .ask(
                ANALYZE_SYSTEM_PROMPT,
                build_analyze_prompt(case_explanation, documents, details),
            )
            .await?;
        let parsed: AnalysisReply = parse_reply(&reply)?;
        if parsed.legal_grounds.is_empty() {
            return Err(IntelligenceError::InvalidResponse(
                "analysis has no legal grounds".into(),
            ));
        }

        let success_probability = parsed.success_probability.round().clamp(0.0, 100.0) as u8;
        info!(success_probability, "model analysis parsed");
        Ok(CaseAnalysis {
            strong_points: parsed.strong_points,
            weak_points: parsed.weak_points,
            recommendations: parsed.recommendations,
            legal_grounds: parsed.legal_grounds,
            success_probability,
        })
    }

    async fn get_references(
        &self,
        analysis: &CaseAnalysis,
    ) -> Result<Vec<LegalReference>, IntelligenceError> {
        let reply = self
            .ask(REFERENCES_SYSTEM_PROMPT, build_references_prompt(analysis))
            .await?;
        let parsed: Vec<ReferenceReply> = parse_reply(&reply)?;
        if parsed.is_empty() {
            return Err(IntelligenceError::InvalidResponse(
                "model returned no references".into(),
            ));
        }

        let references = parsed
            .into_iter()
            .map(|r| {
                let relevance: Relevance = r.relevance.parse().map_err(|e| {
                    warn!(article = %r.article, "reference with unknown relevance tier");
                    IntelligenceError::InvalidResponse(format!("{e}"))
                })?;
                Ok(LegalReference {
                    article: r.article,
                    title: r.title,
                    content: r.content,
                    relevance,
                })
            })
            .collect::<Result<Vec<_>, IntelligenceError>>()?;
        info!(count = references.len(), "model references parsed");
        Ok(references)
    }

    async fn generate_lawsuit(
        &self,
        details: &CaseDetails,
        analysis: &CaseAnalysis,
        references: &[LegalReference],
    ) -> Result<LawsuitDraft, IntelligenceError> {
        let reply = self
            .ask(
                LAWSUIT_SYSTEM_PROMPT,
                build_lawsuit_prompt(details, analysis, references),
            )
            .await?;
        let parsed: LawsuitReply = parse_reply(&reply)?;
        let relief = if parsed.relief_sought.is_empty() {
            standard_relief()
        } else {
            parsed.relief_sought
        };

        Ok(LawsuitDraft::assemble(
            details,
            parsed.facts,
            join_grounds(&analysis.legal_grounds),
            relief,
        ))
    }
}
