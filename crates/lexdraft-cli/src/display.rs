//! Terminal rendering of wizard progress and finished cases.

use lexdraft_core::analysis::sort_by_relevance;
use lexdraft_core::{CaseAnalysis, CaseRecord, LegalReference, Stage};

const MAX_LIST_ITEMS: usize = 10;

pub fn print_stage(stage: Stage) {
    eprintln!(
        "  [{:>3}%] {} ({})",
        stage.progress_percent(),
        stage.title(),
        stage
    );
}

/// Case summary card followed by the lawsuit document.
pub fn print_case(record: &CaseRecord) {
    let details = &record.details;
    let title = if details.title.is_empty() {
        "Untitled case"
    } else {
        details.title.as_str()
    };
    println!("=== {title} ===");
    println!("  {:<26} {}", "client", details.client_name);
    if !details.client_email.is_empty() {
        println!("  {:<26} {}", "email", details.client_email);
    }
    if !details.client_phone.is_empty() {
        println!("  {:<26} {}", "phone", details.client_phone);
    }
    for doc in &details.documents {
        println!("  {:<26} {} ({:.2} MB)", "document", doc.name, doc.size_mb());
    }
    println!();

    if let Some(analysis) = &record.analysis {
        print_analysis(analysis);
    }
    if let Some(references) = &record.references {
        print_references(references);
    }
    if let Some(lawsuit) = &record.lawsuit {
        println!("{}", lawsuit.full_text);
    }
}

fn print_analysis(analysis: &CaseAnalysis) {
    println!("ANALYSIS");
    println!("  {:<26} {}%", "success probability", analysis.success_probability);
    print_list("strong points", &analysis.strong_points);
    print_list("weak points", &analysis.weak_points);
    print_list("recommendations", &analysis.recommendations);
    print_list("legal grounds", &analysis.legal_grounds);
    println!();
}

fn print_list(name: &str, items: &[String]) {
    println!("  {} ({}):", name, items.len());
    for item in items.iter().take(MAX_LIST_ITEMS) {
        println!("    - {item}");
    }
    if items.len() > MAX_LIST_ITEMS {
        println!("    ... and {} more", items.len() - MAX_LIST_ITEMS);
    }
}

fn print_references(references: &[LegalReference]) {
    let mut sorted = references.to_vec();
    sort_by_relevance(&mut sorted);

    println!("LEGAL REFERENCES ({})", sorted.len());
    for r in &sorted {
        println!("  [{:<6}] {} - {}", r.relevance, r.article, r.title);
        println!("           {}", r.content);
    }
    println!();
}
