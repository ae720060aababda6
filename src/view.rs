use std::cmp::Ordering;
use std::sync::Arc;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::models::{Candidate, CandidateField, SortConfig, SortDirection};
use crate::ordered_set::SelectionSet;
use crate::store::StoreState;

/// Filters `candidates` by `search_term` and applies `sort`.
///
/// A candidate matches when any of its fields, lower-cased, contains the
/// lower-cased term. The sort is stable; descending flips the comparison,
/// not the output, so ties keep their insertion order either way.
pub fn derive_view(
    candidates: &[Candidate],
    search_term: &str,
    sort: Option<SortConfig>,
) -> Vec<Candidate> {
    let needle = search_term.to_lowercase();
    let mut rows: Vec<Candidate> = candidates
        .iter()
        .filter(|c| matches_search(c, &needle))
        .cloned()
        .collect();

    if let Some(SortConfig { key, direction }) = sort {
        rows.sort_by(|a, b| match direction {
            SortDirection::Ascending => compare_field(a, b, key),
            SortDirection::Descending => compare_field(b, a, key),
        });
    }

    rows
}

fn matches_search(candidate: &Candidate, needle: &str) -> bool {
    CandidateField::ALL
        .iter()
        .any(|&field| candidate.field_text(field).to_lowercase().contains(needle))
}

fn compare_field(a: &Candidate, b: &Candidate, key: CandidateField) -> Ordering {
    match key {
        CandidateField::Rating => a.rating.total_cmp(&b.rating),
        field => locale_compare(&a.field_text(field), &b.field_text(field)),
    }
}

/// Human ordering for display strings.
///
/// Compares base letters ignoring accents and case first, then accents,
/// then case with lower before upper. Raw bytes break any remaining tie.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    let base = |s: &str| -> String {
        s.nfd()
            .filter(|c| !is_combining_mark(*c))
            .flat_map(char::to_lowercase)
            .collect()
    };
    let accented = |s: &str| -> String { s.nfd().flat_map(char::to_lowercase).collect() };
    let case = |s: &str| -> Vec<bool> { s.chars().map(char::is_uppercase).collect() };

    base(a)
        .cmp(&base(b))
        .then_with(|| accented(a).cmp(&accented(b)))
        .then_with(|| case(a).cmp(&case(b)))
        .then_with(|| a.cmp(b))
}

/// Memoized [`derive_view`] for one store.
///
/// Keyed on the store's candidate revision, the search term and the sort
/// config; selection, columns and view mode never invalidate it.
#[derive(Debug, Default)]
pub struct ViewCache {
    key: Option<(u64, String, Option<SortConfig>)>,
    rows: Arc<[Candidate]>,
    hits: u64,
    misses: u64,
}

impl ViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, state: &StoreState) -> Arc<[Candidate]> {
        let fresh = matches!(
            &self.key,
            Some((rev, term, sort))
                if *rev == state.candidates_revision
                    && *term == state.search_term
                    && *sort == state.sort_config
        );

        if fresh {
            self.hits += 1;
        } else {
            self.misses += 1;
            self.rows =
                derive_view(&state.candidates, &state.search_term, state.sort_config).into();
            self.key = Some((
                state.candidates_revision,
                state.search_term.clone(),
                state.sort_config,
            ));
            tracing::trace!(
                rows = self.rows.len(),
                hits = self.hits,
                misses = self.misses,
                "derived view recomputed"
            );
        }

        Arc::clone(&self.rows)
    }

    #[cfg(test)]
    pub fn hits(&self) -> u64 {
        self.hits
    }

    #[cfg(test)]
    pub fn misses(&self) -> u64 {
        self.misses
    }
}

/// Selection flags for the visible rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionSummary {
    pub visible: usize,
    pub selected: usize,
    pub all_selected: bool,
    pub any_selected: bool,
}

impl SelectionSummary {
    pub fn new(view: &[Candidate], selected: &SelectionSet) -> Self {
        Self {
            visible: view.len(),
            selected: selected.len(),
            all_selected: !view.is_empty()
                && view.iter().all(|c| selected.contains(c.email.as_str())),
            any_selected: !selected.is_empty(),
        }
    }
}

/// Emails to pass to `SelectAll` when the header checkbox is hit:
/// nothing if every visible row is already selected, otherwise all of them.
pub fn select_all_target(view: &[Candidate], selected: &SelectionSet) -> Vec<String> {
    if SelectionSummary::new(view, selected).all_selected {
        Vec::new()
    } else {
        view.iter().map(|c| c.email.clone()).collect()
    }
}

/// Sort to apply when a column header is clicked.
pub fn next_sort(current: Option<SortConfig>, field: CandidateField) -> SortConfig {
    match current {
        Some(SortConfig {
            key,
            direction: SortDirection::Ascending,
        }) if key == field => SortConfig::desc(field),
        _ => SortConfig::asc(field),
    }
}

/// Cell text for `candidate` in column order.
pub fn project_row(candidate: &Candidate, columns: &[CandidateField]) -> Vec<String> {
    columns.iter().map(|&field| candidate.field_text(field)).collect()
}
