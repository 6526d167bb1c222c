use std::str::FromStr;

use chrono::Utc;

use crate::domain::model::{Category, CollegeRef, ComparisonResult, SavedComparison};
use crate::domain::ports::{AuthProvider, HistoryRepo};
use crate::utils::error::{CompareError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Newest,
    Oldest,
    NameAsc,
    NameDesc,
}

impl FromStr for SortMode {
    type Err = CompareError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "newest" => Ok(SortMode::Newest),
            "oldest" => Ok(SortMode::Oldest),
            "a-z" => Ok(SortMode::NameAsc),
            "z-a" => Ok(SortMode::NameDesc),
            other => Err(CompareError::InvalidConfigValueError {
                field: "sort".to_string(),
                value: other.to_string(),
                reason: "expected one of: newest, oldest, a-z, z-a".to_string(),
            }),
        }
    }
}

/// Derives a snapshot name from the selection: the first word of each of the
/// first two college names, plus a "+N more" suffix past two.
pub fn default_name(colleges: &[CollegeRef]) -> String {
    let leads: Vec<&str> = colleges
        .iter()
        .take(2)
        .map(|c| c.name.split_whitespace().next().unwrap_or(c.name.as_str()))
        .collect();
    let mut name = format!("Comparison: {}", leads.join(", "));
    if colleges.len() > 2 {
        name.push_str(&format!(", +{} more", colleges.len() - 2));
    }
    name
}

/// Named snapshots of completed comparisons for the signed-in user.
///
/// Mutations update the local cache and propagate as independent remote
/// calls; a remote failure is surfaced without rolling the cache back.
pub struct HistoryStore<R: HistoryRepo, A: AuthProvider> {
    repo: R,
    auth: A,
    entries: Vec<SavedComparison>,
}

impl<R: HistoryRepo, A: AuthProvider> HistoryStore<R, A> {
    pub fn new(repo: R, auth: A) -> Self {
        Self {
            repo,
            auth,
            entries: Vec::new(),
        }
    }

    fn require_auth(&self, action: &str) -> Result<()> {
        if self.auth.is_authenticated() {
            Ok(())
        } else {
            Err(CompareError::AuthRequiredError {
                action: action.to_string(),
            })
        }
    }

    pub fn entries(&self) -> &[SavedComparison] {
        &self.entries
    }

    /// Loads every saved comparison for the current identity.
    pub async fn fetch(&mut self) -> Result<&[SavedComparison]> {
        self.require_auth("view saved comparisons")?;
        self.entries = self.repo.list().await?;
        tracing::info!("fetched {} saved comparisons", self.entries.len());
        Ok(&self.entries)
    }

    /// Case-insensitive substring match on the snapshot name.
    pub fn filter(&self, query: &str) -> Vec<&SavedComparison> {
        let needle = query.to_lowercase();
        self.entries
            .iter()
            .filter(|e| e.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Filter, then sort: by createdAt for newest/oldest, by name
    /// (case-insensitive) for a-z/z-a.
    pub fn view(&self, query: &str, mode: SortMode) -> Vec<&SavedComparison> {
        let mut hits = self.filter(query);
        match mode {
            SortMode::Newest => hits.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortMode::Oldest => hits.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            SortMode::NameAsc => hits.sort_by_key(|e| e.name.to_lowercase()),
            SortMode::NameDesc => {
                hits.sort_by_key(|e| e.name.to_lowercase());
                hits.reverse();
            }
        }
        hits
    }

    /// Persists a snapshot. An empty or missing name falls back to the
    /// derived default.
    pub async fn save(
        &mut self,
        categories: &[Category],
        colleges: &[CollegeRef],
        results: &ComparisonResult,
        name: Option<&str>,
    ) -> Result<&SavedComparison> {
        self.require_auth("save this comparison")?;

        let name = match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(explicit) => explicit.to_string(),
            None => default_name(colleges),
        };

        let id = self.repo.create(&name, categories, colleges, results).await?;
        tracing::info!("saved comparison {:?} as {}", name, id);

        let saved = SavedComparison {
            id,
            name,
            created_at: Utc::now(),
            categories: categories.to_vec(),
            colleges: colleges.to_vec(),
            results: results.clone(),
        };
        self.entries.insert(0, saved);
        Ok(&self.entries[0])
    }

    /// Renames a snapshot. An empty name is a no-op with no remote call.
    pub async fn rename(&mut self, id: &str, new_name: &str) -> Result<bool> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Ok(false);
        }
        self.require_auth("rename a saved comparison")?;

        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.name = new_name.to_string();
        }
        self.repo.rename(id, new_name).await?;
        Ok(true)
    }

    pub async fn delete(&mut self, id: &str) -> Result<()> {
        self.require_auth("delete a saved comparison")?;
        self.entries.retain(|e| e.id != id);
        self.repo.delete(id).await
    }
}
