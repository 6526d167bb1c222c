pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::adapters::http::ApiClient;
pub use crate::config::{cli::LocalStorage, profile::ComparisonProfile, CliConfig};
pub use crate::core::{
    categories::CategorySet,
    history::{HistoryStore, SortMode},
    job::{CancelSource, CancelToken, JobClient, JobState, PollPolicy},
    selection::CollegeSelector,
    session::ComparisonSession,
};
pub use crate::domain::model::{
    Category, CategoryScore, CollegeRef, CollegeScores, ComparisonRequest, ComparisonResult,
    JobId, JobStatus, SavedComparison,
};
pub use crate::utils::error::{CompareError, Result};
