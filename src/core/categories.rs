use crate::domain::model::{Category, CategoryId};

pub const MAX_CATEGORIES: usize = 8;
pub const MIN_WEIGHT: i64 = 1;
pub const MAX_WEIGHT: i64 = 10;
pub const DEFAULT_WEIGHT: u8 = 5;

/// Ordered collection of weighted evaluation categories.
///
/// A category's name may be empty while the user edits it; `valid()` is the
/// view submission and export must consume.
#[derive(Debug, Clone, Default)]
pub struct CategorySet {
    items: Vec<Category>,
    next_id: CategoryId,
}

impl CategorySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a set from a saved snapshot, preserving ids and order.
    pub fn from_categories(categories: &[Category]) -> Self {
        let next_id = categories.iter().map(|c| c.id + 1).max().unwrap_or(0);
        Self {
            items: categories.to_vec(),
            next_id,
        }
    }

    /// Appends an empty category with the default weight. No-op at capacity.
    pub fn add(&mut self) -> Option<CategoryId> {
        if self.items.len() >= MAX_CATEGORIES {
            tracing::debug!("category limit of {} reached, add ignored", MAX_CATEGORIES);
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(Category {
            id,
            name: String::new(),
            weight: DEFAULT_WEIGHT,
        });
        Some(id)
    }

    /// Any string is accepted, including empty; an empty name just parks the
    /// category outside the valid view.
    pub fn rename(&mut self, id: CategoryId, name: &str) -> bool {
        match self.items.iter_mut().find(|c| c.id == id) {
            Some(category) => {
                category.name = name.to_string();
                true
            }
            None => false,
        }
    }

    /// Weight is clamped into [1,10] whatever the caller sends.
    pub fn set_weight(&mut self, id: CategoryId, weight: i64) -> bool {
        match self.items.iter_mut().find(|c| c.id == id) {
            Some(category) => {
                category.weight = weight.clamp(MIN_WEIGHT, MAX_WEIGHT) as u8;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: CategoryId) -> bool {
        let before = self.items.len();
        self.items.retain(|c| c.id != id);
        self.items.len() != before
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Categories with a non-empty name, in insertion order. Submission and
    /// export consume this view, never the raw set.
    pub fn valid(&self) -> Vec<Category> {
        self.items.iter().filter(|c| c.is_valid()).cloned().collect()
    }
}
