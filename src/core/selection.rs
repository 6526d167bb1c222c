use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::domain::model::CollegeRef;
use crate::domain::ports::CollegeDirectory;
use crate::utils::error::Result;

pub const MIN_QUERY_CHARS: usize = 2;
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Pure permutation: move the element at `from` to position `to`. Returns
/// None for out-of-range indices. The selection multiset is always preserved.
pub fn reordered<T: Clone>(list: &[T], from: usize, to: usize) -> Option<Vec<T>> {
    if from >= list.len() || to >= list.len() {
        return None;
    }
    let mut next = list.to_vec();
    let moved = next.remove(from);
    next.insert(to, moved);
    Some(next)
}

/// Search, select, de-duplicate and reorder the colleges being compared.
///
/// Selection order is display order only; it never affects scoring, but it
/// does drive the auto-generated name of a saved comparison.
pub struct CollegeSelector<D: CollegeDirectory> {
    directory: D,
    selected: Vec<CollegeRef>,
    debounce: Duration,
    page_size: usize,
    generation: AtomicU64,
}

impl<D: CollegeDirectory> CollegeSelector<D> {
    pub fn new(directory: D, debounce: Duration, page_size: usize) -> Self {
        Self {
            directory,
            selected: Vec::new(),
            debounce,
            page_size,
            generation: AtomicU64::new(0),
        }
    }

    /// Debounced directory search. Returns `None` without touching the
    /// directory when the trimmed query is shorter than two characters, or
    /// when a newer search supersedes this one during the debounce window.
    pub async fn search(&self, query: &str) -> Result<Option<Vec<CollegeRef>>> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            return Ok(None);
        }

        let my_generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.debounce).await;
        if self.generation.load(Ordering::SeqCst) != my_generation {
            tracing::debug!("search for {:?} superseded before firing", query);
            return Ok(None);
        }

        let hits = self.directory.search(query, self.page_size).await?;
        tracing::debug!("search for {:?} returned {} colleges", query, hits.len());
        Ok(Some(hits))
    }

    /// Idempotent by id: adding an already-selected college is a no-op.
    pub fn add(&mut self, college: CollegeRef) -> bool {
        if self.selected.iter().any(|c| c.id == college.id) {
            return false;
        }
        self.selected.push(college);
        true
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.selected.len();
        self.selected.retain(|c| c.id != id);
        self.selected.len() != before
    }

    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        match reordered(&self.selected, from, to) {
            Some(next) => {
                self.selected = next;
                true
            }
            None => false,
        }
    }

    pub fn selected(&self) -> &[CollegeRef] {
        &self.selected
    }

    pub fn ids(&self) -> Vec<String> {
        self.selected.iter().map(|c| c.id.clone()).collect()
    }

    pub fn set_selected(&mut self, colleges: Vec<CollegeRef>) {
        self.selected = colleges;
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}
