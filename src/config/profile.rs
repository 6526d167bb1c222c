use crate::core::categories::{CategorySet, MAX_CATEGORIES};
use crate::domain::model::CollegeRef;
use crate::utils::error::{CompareError, Result};
use crate::utils::validation;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// A comparison profile: the categories and colleges a CLI run compares.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonProfile {
    pub comparison: ProfileMeta,
    pub categories: Vec<CategoryEntry>,
    pub colleges: Vec<CollegeEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileMeta {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub name: String,
    pub weight: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollegeEntry {
    pub id: String,
    pub name: String,
    pub state: Option<String>,
    pub r#type: Option<String>,
}

impl ComparisonProfile {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CompareError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| CompareError::InvalidConfigValueError {
            field: "profile".to_string(),
            value: "<toml>".to_string(),
            reason: format!("TOML parsing error: {}", e),
        })
    }

    pub fn validate_config(&self) -> Result<()> {
        if self.categories.is_empty() || self.categories.len() > MAX_CATEGORIES {
            return Err(CompareError::InvalidConfigValueError {
                field: "categories".to_string(),
                value: self.categories.len().to_string(),
                reason: format!("expected between 1 and {} categories", MAX_CATEGORIES),
            });
        }
        for category in &self.categories {
            validation::validate_non_empty_string("categories.name", &category.name)?;
        }

        let distinct: HashSet<&str> = self.colleges.iter().map(|c| c.id.as_str()).collect();
        if distinct.len() < 2 {
            return Err(CompareError::InvalidConfigValueError {
                field: "colleges".to_string(),
                value: self.colleges.len().to_string(),
                reason: "expected at least 2 distinct colleges".to_string(),
            });
        }
        for college in &self.colleges {
            validation::validate_non_empty_string("colleges.id", &college.id)?;
            validation::validate_non_empty_string("colleges.name", &college.name)?;
        }
        Ok(())
    }

    /// Builds the session category set; out-of-range weights are clamped the
    /// same way interactive edits are.
    pub fn category_set(&self) -> CategorySet {
        let mut set = CategorySet::new();
        for entry in &self.categories {
            if let Some(id) = set.add() {
                set.rename(id, &entry.name);
                set.set_weight(id, entry.weight);
            }
        }
        set
    }

    pub fn college_refs(&self) -> Vec<CollegeRef> {
        self.colleges
            .iter()
            .map(|c| CollegeRef {
                id: c.id.clone(),
                name: c.name.clone(),
                state: c.state.clone(),
                r#type: c.r#type.clone(),
                acceptance_rate: None,
                tuition: None,
            })
            .collect()
    }
}
