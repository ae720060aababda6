use serde::Serialize;
use std::sync::Arc;

use crate::error::ValidationError;
use crate::models::{Candidate, CandidateField, CandidateId, NewCandidate, SortConfig, ViewMode};
use crate::ordered_set::{OrderedSet, SelectionSet};

/// Everything the talent pool shows, as one immutable snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreState {
    pub candidates: Vec<Candidate>,
    pub selected_candidates: SelectionSet,
    pub search_term: String,
    pub sort_config: Option<SortConfig>,
    pub visible_columns: OrderedSet<CandidateField>,
    pub view_mode: ViewMode,
    /// Bumped on every change to `candidates`.
    pub candidates_revision: u64,
    /// Bumped on every change to anything.
    pub revision: u64,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            candidates: Vec::new(),
            selected_candidates: SelectionSet::new(),
            search_term: String::new(),
            sort_config: None,
            visible_columns: CandidateField::ALL.into_iter().collect(),
            view_mode: ViewMode::Table,
            candidates_revision: 0,
            revision: 0,
        }
    }
}

impl StoreState {
    pub fn candidate_by_email(&self, email: &str) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.email == email)
    }

    pub fn is_selected(&self, email: &str) -> bool {
        self.selected_candidates.contains(email)
    }
}

/// A state transition, one per store operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    AddCandidate { id: CandidateId, candidate: NewCandidate },
    DeleteSelected,
    ToggleSelect(String),
    SelectAll(Vec<String>),
    SetSearchTerm(String),
    SetSortConfig(Option<SortConfig>),
    ToggleColumn(CandidateField),
    SetVisibleColumns(Vec<CandidateField>),
    SetViewMode(ViewMode),
    UpdateRating { email: String, rating: f64 },
}

/// Owns the talent pool state. Mutation only happens through [`Action`]s;
/// readers hold `Arc` snapshots that never change underneath them.
#[derive(Debug, Clone, Default)]
pub struct CandidateStore {
    state: Arc<StoreState>,
}

impl CandidateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    pub fn snapshot(&self) -> Arc<StoreState> {
        Arc::clone(&self.state)
    }

    pub fn dispatch(&mut self, action: Action) -> Result<(), ValidationError> {
        if let Action::AddCandidate { candidate, .. } = &action {
            if let Err(err) = validate(&self.state, candidate) {
                tracing::warn!(email = %candidate.email, error = %err, "rejected candidate");
                return Err(err);
            }
        }

        tracing::debug!(?action, "dispatch");
        let state = Arc::make_mut(&mut self.state);
        if apply(state, action) {
            state.revision += 1;
        }
        Ok(())
    }

    pub fn add_candidate(
        &mut self,
        candidate: NewCandidate,
    ) -> Result<CandidateId, ValidationError> {
        let id = CandidateId::new();
        self.dispatch(Action::AddCandidate { id, candidate })?;
        Ok(id)
    }

    /// Removes every selected candidate. Returns how many were removed.
    pub fn delete_selected(&mut self) -> usize {
        let before = self.state.candidates.len();
        self.dispatch_total(Action::DeleteSelected);
        before - self.state.candidates.len()
    }

    pub fn toggle_select(&mut self, email: &str) {
        self.dispatch_total(Action::ToggleSelect(email.to_string()));
    }

    pub fn select_all(&mut self, emails: Vec<String>) {
        self.dispatch_total(Action::SelectAll(emails));
    }

    pub fn set_search_term(&mut self, term: &str) {
        self.dispatch_total(Action::SetSearchTerm(term.to_string()));
    }

    pub fn set_sort_config(&mut self, config: Option<SortConfig>) {
        self.dispatch_total(Action::SetSortConfig(config));
    }

    pub fn toggle_column(&mut self, field: CandidateField) {
        self.dispatch_total(Action::ToggleColumn(field));
    }

    pub fn set_visible_columns(&mut self, fields: Vec<CandidateField>) {
        self.dispatch_total(Action::SetVisibleColumns(fields));
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.dispatch_total(Action::SetViewMode(mode));
    }

    pub fn update_rating(&mut self, email: &str, rating: f64) {
        self.dispatch_total(Action::UpdateRating {
            email: email.to_string(),
            rating,
        });
    }

    // Only AddCandidate can be rejected.
    fn dispatch_total(&mut self, action: Action) {
        let _ = self.dispatch(action);
    }
}

fn validate(state: &StoreState, candidate: &NewCandidate) -> Result<(), ValidationError> {
    if candidate.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if candidate.email.trim().is_empty() {
        return Err(ValidationError::EmptyEmail);
    }
    if state.candidate_by_email(&candidate.email).is_some() {
        return Err(ValidationError::DuplicateEmail(candidate.email.clone()));
    }
    if !candidate.rating.is_finite() || !(0.0..=5.0).contains(&candidate.rating) {
        return Err(ValidationError::RatingOutOfRange(candidate.rating));
    }
    Ok(())
}

/// Applies `action` in place. Returns whether anything changed.
fn apply(state: &mut StoreState, action: Action) -> bool {
    match action {
        Action::AddCandidate { id, candidate } => {
            state.candidates.push(candidate.into_candidate(id));
            state.candidates_revision += 1;
            true
        }
        Action::DeleteSelected => {
            let before = state.candidates.len();
            let selected = &state.selected_candidates;
            state.candidates.retain(|c| !selected.contains(c.email.as_str()));
            let removed = before - state.candidates.len();
            if removed > 0 {
                state.candidates_revision += 1;
            }
            tracing::info!(removed, "deleted selected candidates");
            let had_selection = !state.selected_candidates.is_empty();
            state.selected_candidates.clear();
            removed > 0 || had_selection
        }
        Action::ToggleSelect(email) => {
            state.selected_candidates.toggle(email);
            true
        }
        Action::SelectAll(emails) => {
            replace(&mut state.selected_candidates, emails.into_iter().collect())
        }
        Action::SetSearchTerm(term) => replace(&mut state.search_term, term),
        Action::SetSortConfig(config) => replace(&mut state.sort_config, config),
        Action::ToggleColumn(field) => {
            state.visible_columns.toggle(field);
            true
        }
        Action::SetVisibleColumns(fields) => {
            replace(&mut state.visible_columns, fields.into_iter().collect())
        }
        Action::SetViewMode(mode) => replace(&mut state.view_mode, mode),
        Action::UpdateRating { email, rating } => {
            let Some(candidate) = state.candidates.iter_mut().find(|c| c.email == email) else {
                return false;
            };
            candidate.rating = rating;
            state.candidates_revision += 1;
            true
        }
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Stage;
    use proptest::prelude::*;

    fn candidate(name: &str, email: &str, rating: f64) -> NewCandidate {
        NewCandidate {
            name: name.to_string(),
            email: email.to_string(),
            rating,
            ..Default::default()
        }
    }

    fn two_candidates() -> CandidateStore {
        let mut store = CandidateStore::new();
        store.add_candidate(candidate("Anna", "a@x.com", 2.0)).unwrap();
        store.add_candidate(candidate("Ben", "b@x.com", 4.0)).unwrap();
        store
    }

    fn emails(state: &StoreState) -> Vec<&str> {
        state.candidates.iter().map(|c| c.email.as_str()).collect()
    }

    #[test]
    fn initial_state_shows_everything() {
        let store = CandidateStore::new();
        let state = store.state();
        assert!(state.candidates.is_empty());
        assert!(state.selected_candidates.is_empty());
        assert_eq!(state.search_term, "");
        assert_eq!(state.sort_config, None);
        assert_eq!(state.visible_columns.as_slice(), &CandidateField::ALL);
        assert_eq!(state.view_mode, ViewMode::Table);
    }

    #[test]
    fn add_appends_in_order() {
        let mut store = two_candidates();
        store.add_candidate(candidate("Cem", "c@x.com", 0.0)).unwrap();
        assert_eq!(emails(store.state()), ["a@x.com", "b@x.com", "c@x.com"]);
        assert_eq!(store.state().candidates[2].stage, Stage::New);
    }

    #[test]
    fn add_rejects_invalid_payloads() {
        let mut store = two_candidates();
        let before = store.snapshot();

        assert_eq!(
            store.add_candidate(candidate("  ", "z@x.com", 1.0)),
            Err(ValidationError::EmptyName)
        );
        assert_eq!(
            store.add_candidate(candidate("Zed", "", 1.0)),
            Err(ValidationError::EmptyEmail)
        );
        assert_eq!(
            store.add_candidate(candidate("Anna 2", "a@x.com", 1.0)),
            Err(ValidationError::DuplicateEmail("a@x.com".to_string()))
        );
        assert_eq!(
            store.add_candidate(candidate("Zed", "z@x.com", 5.5)),
            Err(ValidationError::RatingOutOfRange(5.5))
        );
        assert!(store.add_candidate(candidate("Zed", "z@x.com", f64::NAN)).is_err());

        assert_eq!(store.state(), &*before);
    }

    #[test]
    fn delete_selected_removes_only_selected() {
        let mut store = two_candidates();
        store.add_candidate(candidate("Cem", "c@x.com", 3.0)).unwrap();
        store.toggle_select("a@x.com");
        store.toggle_select("c@x.com");

        assert_eq!(store.delete_selected(), 2);
        assert_eq!(emails(store.state()), ["b@x.com"]);
        assert!(store.state().selected_candidates.is_empty());
    }

    #[test]
    fn delete_keeps_survivor_order() {
        let mut store = CandidateStore::new();
        for (name, email) in [
            ("Anna", "a@x.com"),
            ("Ben", "b@x.com"),
            ("Cem", "c@x.com"),
            ("Dila", "d@x.com"),
            ("Emre", "e@x.com"),
        ] {
            store.add_candidate(candidate(name, email, 3.0)).unwrap();
        }
        store.toggle_select("d@x.com");
        store.toggle_select("b@x.com");

        assert_eq!(store.delete_selected(), 2);
        assert_eq!(emails(store.state()), ["a@x.com", "c@x.com", "e@x.com"]);
    }

    #[test]
    fn delete_prunes_stale_selection() {
        let mut store = two_candidates();
        store.toggle_select("ghost@x.com");
        assert_eq!(store.delete_selected(), 0);
        assert_eq!(store.state().candidates.len(), 2);
        assert!(store.state().selected_candidates.is_empty());
    }

    #[test]
    fn toggle_select_twice_is_identity() {
        let mut store = two_candidates();
        store.toggle_select("b@x.com");
        let before = store.state().selected_candidates.clone();
        store.toggle_select("a@x.com");
        store.toggle_select("a@x.com");
        assert_eq!(store.state().selected_candidates, before);
    }

    #[test]
    fn toggle_select_twice_restores_earlier_member() {
        let mut store = two_candidates();
        store.select_all(vec!["a@x.com".into(), "b@x.com".into()]);
        let before = store.snapshot();
        store.toggle_select("a@x.com");
        assert!(!store.state().is_selected("a@x.com"));
        store.toggle_select("a@x.com");
        assert_eq!(store.state().selected_candidates, before.selected_candidates);
        assert!(store.state().is_selected("a@x.com"));
    }

    #[test]
    fn select_all_replaces_selection() {
        let mut store = two_candidates();
        store.toggle_select("a@x.com");
        store.select_all(vec!["b@x.com".into(), "b@x.com".into()]);
        assert_eq!(store.state().selected_candidates.as_slice(), &["b@x.com".to_string()]);
        store.select_all(Vec::new());
        assert!(store.state().selected_candidates.is_empty());
    }

    #[test]
    fn search_term_is_stored_verbatim() {
        let mut store = two_candidates();
        store.set_search_term("  Ben ");
        assert_eq!(store.state().search_term, "  Ben ");
    }

    #[test]
    fn sort_config_can_be_cleared() {
        let mut store = two_candidates();
        store.set_sort_config(Some(SortConfig::desc(CandidateField::Rating)));
        assert_eq!(store.state().sort_config, Some(SortConfig::desc(CandidateField::Rating)));
        store.set_sort_config(None);
        assert_eq!(store.state().sort_config, None);
    }

    #[test]
    fn toggle_column_readds_at_end() {
        let mut store = two_candidates();
        store.toggle_column(CandidateField::Rating);
        assert!(!store.state().visible_columns.contains(&CandidateField::Rating));
        store.toggle_column(CandidateField::Rating);
        assert_eq!(
            store.state().visible_columns.as_slice(),
            &[
                CandidateField::Name,
                CandidateField::Email,
                CandidateField::Stage,
                CandidateField::AppliedJob,
                CandidateField::Resume,
                CandidateField::Rating,
            ]
        );
    }

    #[test]
    fn visible_columns_may_be_empty() {
        let mut store = two_candidates();
        store.set_visible_columns(Vec::new());
        assert!(store.state().visible_columns.is_empty());
        store.set_visible_columns(vec![CandidateField::Email, CandidateField::Name]);
        assert_eq!(
            store.state().visible_columns.as_slice(),
            &[CandidateField::Email, CandidateField::Name]
        );
    }

    #[test]
    fn view_mode_is_replaced() {
        let mut store = two_candidates();
        store.set_view_mode(ViewMode::Sheet);
        assert_eq!(store.state().view_mode, ViewMode::Sheet);
    }

    #[test]
    fn update_rating_touches_one_candidate() {
        let mut store = two_candidates();
        store.update_rating("b@x.com", 7.5);
        let state = store.state();
        assert_eq!(state.candidate_by_email("b@x.com").unwrap().rating, 7.5);
        assert_eq!(state.candidate_by_email("a@x.com").unwrap().rating, 2.0);
        assert_eq!(state.candidate_by_email("b@x.com").unwrap().name, "Ben");
    }

    #[test]
    fn update_rating_unknown_email_is_noop() {
        let mut store = two_candidates();
        let before = store.snapshot();
        store.update_rating("nobody@x.com", 1.0);
        assert_eq!(store.state(), &*before);
    }

    #[test]
    fn snapshots_are_not_mutated() {
        let mut store = two_candidates();
        let old = store.snapshot();
        store.set_search_term("ben");
        store.toggle_select("a@x.com");
        assert_eq!(old.search_term, "");
        assert!(old.selected_candidates.is_empty());
        assert!(store.state().revision > old.revision);
    }

    #[test]
    fn candidate_revision_tracks_list_changes_only() {
        let mut store = two_candidates();
        let rev = store.state().candidates_revision;
        store.set_search_term("x");
        store.set_sort_config(Some(SortConfig::asc(CandidateField::Name)));
        store.toggle_select("a@x.com");
        assert_eq!(store.state().candidates_revision, rev);
        store.update_rating("a@x.com", 3.0);
        assert_eq!(store.state().candidates_revision, rev + 1);
    }

    #[test]
    fn snapshot_serializes_with_wire_names() {
        let mut store = two_candidates();
        store.toggle_select("b@x.com");
        store.set_visible_columns(vec![CandidateField::Name, CandidateField::AppliedJob]);

        let json = serde_json::to_value(store.state()).unwrap();
        assert_eq!(json["selectedCandidates"], serde_json::json!(["b@x.com"]));
        assert_eq!(json["visibleColumns"], serde_json::json!(["name", "appliedJob"]));
        assert_eq!(json["viewMode"], "table");
        assert_eq!(json["searchTerm"], "");
        assert!(json["sortConfig"].is_null());
        assert_eq!(json["candidates"][1]["email"], "b@x.com");
        assert_eq!(json["candidates"][1]["rating"], 4.0);

        store.set_sort_config(Some(SortConfig::desc(CandidateField::Rating)));
        let json = serde_json::to_value(store.state()).unwrap();
        assert_eq!(
            json["sortConfig"],
            serde_json::json!({"key": "rating", "direction": "desc"})
        );
    }

    proptest! {
        #[test]
        fn toggle_select_is_an_involution(
            initial in proptest::collection::vec("[a-d]@x\\.com", 0..6),
            email in "[a-d]@x\\.com",
        ) {
            let mut store = two_candidates();
            store.select_all(initial);
            let before = store.state().selected_candidates.clone();
            store.toggle_select(&email);
            store.toggle_select(&email);
            prop_assert_eq!(&store.state().selected_candidates, &before);
        }
    }
}
