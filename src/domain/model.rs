use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::utils::error::{CompareError, Result};

pub type CategoryId = u32;

/// Weighted evaluation dimension. The name may be empty while the user is
/// still typing it; only categories with a non-empty name take part in
/// submission and export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub weight: u8,
}

impl Category {
    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

/// Lightweight reference to a college: only the fields needed for display
/// and export, never the full institution record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollegeRef {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceptance_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tuition: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRequest {
    pub college_ids: Vec<String>,
    pub categories: Vec<Category>,
}

impl ComparisonRequest {
    /// Invariants checked before anything goes on the wire: at least two
    /// distinct colleges and at least one named category.
    pub fn validate(&self) -> Result<()> {
        let distinct: HashSet<&str> = self.college_ids.iter().map(String::as_str).collect();
        if distinct.len() < 2 {
            return Err(CompareError::ValidationError {
                message: "select at least two distinct colleges to compare".to_string(),
            });
        }
        if !self.categories.iter().any(Category::is_valid) {
            return Err(CompareError::ValidationError {
                message: "add at least one named category".to_string(),
            });
        }
        Ok(())
    }
}

/// Opaque evaluator-issued job identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Job status as a discriminated union. The wire payload is duck-typed; the
/// HTTP adapter decodes it into this union exactly once so the polling loop
/// can never mistake a pending payload for a completed one.
#[derive(Debug, Clone)]
pub enum JobStatus {
    Queued,
    Running,
    Complete(ComparisonResult),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub score: f64,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollegeScores {
    #[serde(rename = "ref")]
    pub college: CollegeRef,
    pub total_score: f64,
    pub scores_by_category: HashMap<String, CategoryScore>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub entities: Vec<CollegeScores>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Immutable persisted snapshot of a completed comparison. Carries its own
/// category set so an export of a reloaded snapshot uses the categories it
/// was scored under, not whatever the session is editing now. Renames change
/// only `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedComparison {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub categories: Vec<Category>,
    #[serde(rename = "entities")]
    pub colleges: Vec<CollegeRef>,
    pub results: ComparisonResult,
}
