//! Lawsuit drafts and the court document template they render into.

use serde::{Deserialize, Serialize};

use crate::case::CaseDetails;

pub const DEFENDANT_PLACEHOLDER: &str = "[Company Name - To be filled]";

/// Maximum number of explanation characters quoted in the facts section.
const FACTS_EXCERPT_CHARS: usize = 200;

const GROUNDS_CONCLUSION: &str = "The termination violated fundamental principles of employment law and caused significant damages to the Plaintiff.";

pub const STANDARD_RELIEF: [&str; 5] = [
    "Declaration that the termination was unlawful",
    "Reinstatement to the previous position",
    "Payment of lost wages and benefits",
    "Compensation for moral damages",
    "Legal costs and attorney fees",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parties {
    pub plaintiff: String,
    pub defendant: String,
}

/// A generated lawsuit. `full_text` is the rendered document and is shown
/// verbatim by consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LawsuitDraft {
    pub title: String,
    pub parties: Parties,
    pub facts: String,
    pub legal_grounds: String,
    pub relief_sought: Vec<String>,
    pub full_text: String,
}

impl LawsuitDraft {
    /// Build a draft for `details` and render its full text.
    pub fn assemble(
        details: &CaseDetails,
        facts: String,
        legal_grounds: String,
        relief_sought: Vec<String>,
    ) -> Self {
        let parties = Parties {
            plaintiff: details.client_name.clone(),
            defendant: DEFENDANT_PLACEHOLDER.to_string(),
        };
        let full_text = render_full_text(&parties.plaintiff, &facts, &legal_grounds, &relief_sought);
        Self {
            title: format!(
                "Lawsuit for Wrongful Termination - {} vs. [Company Name]",
                details.client_name
            ),
            parties,
            facts,
            legal_grounds,
            relief_sought,
            full_text,
        }
    }
}

/// Boilerplate facts paragraph followed by an excerpt of the explanation.
pub fn standard_facts(case_explanation: &str) -> String {
    let excerpt: String = case_explanation.chars().take(FACTS_EXCERPT_CHARS).collect();
    format!(
        "The Plaintiff was employed by the Defendant under an employment contract dated [Contract Date]. \
         On [Termination Date], the Defendant unlawfully terminated the Plaintiff's employment without \
         following proper procedures as required by Kosovo Labor Law. {excerpt}..."
    )
}

/// Join the analysis grounds into the legal-grounds paragraph.
pub fn join_grounds(grounds: &[String]) -> String {
    format!("{}. {GROUNDS_CONCLUSION}", grounds.join(". "))
}

pub fn standard_relief() -> Vec<String> {
    STANDARD_RELIEF.iter().map(|s| s.to_string()).collect()
}

fn render_full_text(plaintiff: &str, facts: &str, legal_grounds: &str, relief: &[String]) -> String {
    let relief_lines = relief
        .iter()
        .map(|item| format!("• {item}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "BASIC COURT OF PRISTINA
CIVIL DIVISION

Plaintiff: {plaintiff}
Address: [To be provided]
Represented by: [Attorney Name]

vs.

Defendant: [Company Name]
Address: [Company Address]

LAWSUIT
FOR WRONGFUL TERMINATION AND DAMAGES

FACTS:
{facts}

LEGAL GROUNDS:
{legal_grounds}

RELIEF SOUGHT:
{relief_lines}

WHEREFORE, Plaintiff respectfully requests that this Honorable Court grant the relief sought above and award such other relief as the Court deems just and proper.

Respectfully submitted,
[Attorney Signature]
[Attorney Name]
[Bar Number]
[Date]"
    )
}
