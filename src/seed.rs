use anyhow::{Context, Result};
use std::path::Path;

use crate::models::{NewCandidate, Stage};
use crate::store::CandidateStore;

const SAMPLE_RESUME: &str = "https://www.canva.com/search?q=cv%20t%C3%BCrk%C3%A7e";

/// The talent pool every session starts with unless a seed file is given.
pub fn builtin() -> Vec<NewCandidate> {
    vec![
        NewCandidate {
            name: "Melek Gürel".to_string(),
            email: "melek@example.com".to_string(),
            stage: Stage::Interview,
            rating: 4.5,
            applied_job: "Frontend developer".to_string(),
            resume: SAMPLE_RESUME.to_string(),
        },
        NewCandidate {
            name: "Serkan Güneş".to_string(),
            email: "serkan@example.com".to_string(),
            stage: Stage::Hired,
            rating: 4.8,
            applied_job: "Product Manager".to_string(),
            resume: SAMPLE_RESUME.to_string(),
        },
    ]
}

/// Reads a JSON array of candidates.
pub fn load_seed(path: &Path) -> Result<Vec<NewCandidate>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file: {}", path.display()))?;
    parse_seed(&content).with_context(|| format!("Invalid seed file: {}", path.display()))
}

pub fn parse_seed(content: &str) -> Result<Vec<NewCandidate>> {
    Ok(serde_json::from_str(content)?)
}

/// Builds a store holding `entries`, validating each one as it is added.
pub fn populate(entries: Vec<NewCandidate>) -> Result<CandidateStore> {
    let mut store = CandidateStore::new();
    for (i, entry) in entries.into_iter().enumerate() {
        let email = entry.email.clone();
        store
            .add_candidate(entry)
            .with_context(|| format!("Seed entry #{} ({})", i, email))?;
    }
    tracing::info!(count = store.state().candidates.len(), "seeded talent pool");
    Ok(store)
}
