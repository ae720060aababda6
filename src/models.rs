use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(Uuid);

impl CandidateId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CandidateId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(skip)]
    pub id: CandidateId,
    pub name: String,
    pub email: String, // unique within a store
    pub stage: Stage,
    pub rating: f64, // 0-5 in half steps, not clamped by the store
    pub applied_job: String,
    pub resume: String, // URL, not validated
}

impl Candidate {
    /// Text of a single field as shown in a cell and matched by search.
    pub fn field_text(&self, field: CandidateField) -> String {
        match field {
            CandidateField::Name => self.name.clone(),
            CandidateField::Email => self.email.clone(),
            CandidateField::Stage => self.stage.to_string(),
            CandidateField::Rating => self.rating.to_string(),
            CandidateField::AppliedJob => self.applied_job.clone(),
            CandidateField::Resume => self.resume.clone(),
        }
    }
}

/// Payload for adding a candidate; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCandidate {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub stage: Stage,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub applied_job: String,
    #[serde(default)]
    pub resume: String,
}

impl Default for NewCandidate {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            stage: Stage::New,
            rating: 0.0,
            applied_job: String::new(),
            resume: String::new(),
        }
    }
}

impl NewCandidate {
    pub fn into_candidate(self, id: CandidateId) -> Candidate {
        Candidate {
            id,
            name: self.name,
            email: self.email,
            stage: self.stage,
            rating: self.rating,
            applied_job: self.applied_job,
            resume: self.resume,
        }
    }
}

/// Pipeline status. Open-ended: anything outside the offered values is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Stage {
    #[default]
    New,
    Interview,
    Hired,
    Rejected,
    Other(String),
}

impl Stage {
    pub fn as_str(&self) -> &str {
        match self {
            Stage::New => "New",
            Stage::Interview => "Interview",
            Stage::Hired => "Hired",
            Stage::Rejected => "Rejected",
            Stage::Other(s) => s.as_str(),
        }
    }

    /// Stages offered by the add dialog, in cycling order.
    pub const OFFERED: [Stage; 4] = [
        Stage::New,
        Stage::Interview,
        Stage::Hired,
        Stage::Rejected,
    ];

    /// Next offered stage, wrapping. Custom stages restart at `New`.
    pub fn next(&self) -> Stage {
        match Self::OFFERED.iter().position(|s| s == self) {
            Some(i) => Self::OFFERED[(i + 1) % Self::OFFERED.len()].clone(),
            None => Stage::New,
        }
    }

    /// Previous offered stage, wrapping. Custom stages restart at `Rejected`.
    pub fn prev(&self) -> Stage {
        let n = Self::OFFERED.len();
        match Self::OFFERED.iter().position(|s| s == self) {
            Some(i) => Self::OFFERED[(i + n - 1) % n].clone(),
            None => Stage::Rejected,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Stage {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "new" => Stage::New,
            "interview" => Stage::Interview,
            "hired" => Stage::Hired,
            "rejected" => Stage::Rejected,
            _ => Stage::Other(s),
        }
    }
}

impl From<&str> for Stage {
    fn from(s: &str) -> Self {
        Stage::from(s.to_string())
    }
}

impl From<Stage> for String {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CandidateField {
    Name,
    Email,
    Stage,
    Rating,
    AppliedJob,
    Resume,
}

impl CandidateField {
    pub const ALL: [CandidateField; 6] = [
        CandidateField::Name,
        CandidateField::Email,
        CandidateField::Stage,
        CandidateField::Rating,
        CandidateField::AppliedJob,
        CandidateField::Resume,
    ];

    pub fn key(self) -> &'static str {
        match self {
            CandidateField::Name => "name",
            CandidateField::Email => "email",
            CandidateField::Stage => "stage",
            CandidateField::Rating => "rating",
            CandidateField::AppliedJob => "appliedJob",
            CandidateField::Resume => "resume",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CandidateField::Name => "Name",
            CandidateField::Email => "Email",
            CandidateField::Stage => "Stage",
            CandidateField::Rating => "Rating",
            CandidateField::AppliedJob => "Applied job",
            CandidateField::Resume => "Resume",
        }
    }
}

impl fmt::Display for CandidateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for CandidateField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let squashed: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_lowercase();
        CandidateField::ALL
            .into_iter()
            .find(|field| {
                field.key().to_lowercase() == squashed
                    || field.label().replace(' ', "").to_lowercase() == squashed
            })
            .ok_or_else(|| format!("unknown column '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortConfig {
    pub key: CandidateField,
    pub direction: SortDirection,
}

impl SortConfig {
    pub fn asc(key: CandidateField) -> Self {
        Self {
            key,
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(key: CandidateField) -> Self {
        Self {
            key,
            direction: SortDirection::Descending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Table,
    #[serde(alias = "list")]
    Sheet,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Table => ViewMode::Sheet,
            ViewMode::Sheet => ViewMode::Table,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_parses_key_and_label() {
        assert_eq!("appliedJob".parse::<CandidateField>().unwrap(), CandidateField::AppliedJob);
        assert_eq!("applied-job".parse::<CandidateField>().unwrap(), CandidateField::AppliedJob);
        assert_eq!("Applied job".parse::<CandidateField>().unwrap(), CandidateField::AppliedJob);
        assert_eq!("RATING".parse::<CandidateField>().unwrap(), CandidateField::Rating);
        assert!("salary".parse::<CandidateField>().is_err());
    }

    #[test]
    fn stage_keeps_unknown_values() {
        assert_eq!(Stage::from("interview"), Stage::Interview);
        assert_eq!(Stage::from("Offer sent"), Stage::Other("Offer sent".to_string()));
        assert_eq!(Stage::from("Offer sent").to_string(), "Offer sent");
        assert_eq!(Stage::Rejected.next(), Stage::New);
        assert_eq!(Stage::New.prev(), Stage::Rejected);
    }

    #[test]
    fn stage_cycles_through_offered_values() {
        let mut stage = Stage::New;
        let mut seen = Vec::new();
        for _ in 0..Stage::OFFERED.len() {
            seen.push(stage.clone());
            assert_eq!(stage.next().prev(), stage);
            stage = stage.next();
        }
        assert_eq!(seen, Stage::OFFERED);
        assert_eq!(stage, Stage::New);

        let custom = Stage::from("Offer sent");
        assert!(!Stage::OFFERED.contains(&custom));
        assert_eq!(custom.next(), Stage::New);
        assert_eq!(custom.prev(), Stage::Rejected);
    }

    #[test]
    fn rating_text_drops_trailing_zero() {
        let c = NewCandidate {
            name: "Anna".into(),
            email: "a@x.com".into(),
            rating: 4.0,
            ..Default::default()
        }
        .into_candidate(CandidateId::new());
        assert_eq!(c.field_text(CandidateField::Rating), "4");

        let c = Candidate { rating: 4.5, ..c };
        assert_eq!(c.field_text(CandidateField::Rating), "4.5");
    }

    #[test]
    fn new_candidate_reads_seed_shape() {
        let json = r#"{
            "name": "Anna",
            "email": "a@x.com",
            "stage": "Hired",
            "rating": 3.5,
            "appliedJob": "QA",
            "resume": "https://cv"
        }"#;
        let c: NewCandidate = serde_json::from_str(json).unwrap();
        assert_eq!(c.stage, Stage::Hired);
        assert_eq!(c.applied_job, "QA");

        let minimal: NewCandidate =
            serde_json::from_str(r#"{"name":"B","email":"b@x.com"}"#).unwrap();
        assert_eq!(minimal.stage, Stage::New);
        assert_eq!(minimal.rating, 0.0);
    }

    #[test]
    fn sort_and_view_wire_names() {
        let cfg: SortConfig =
            serde_json::from_str(r#"{"key":"appliedJob","direction":"desc"}"#).unwrap();
        assert_eq!(cfg, SortConfig::desc(CandidateField::AppliedJob));
        let mode: ViewMode = serde_json::from_str(r#""list""#).unwrap();
        assert_eq!(mode, ViewMode::Sheet);
    }
}
