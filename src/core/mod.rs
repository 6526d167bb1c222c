pub mod categories;
pub mod export;
pub mod history;
pub mod job;
pub mod selection;
pub mod session;

pub use crate::domain::model::{
    Category, CategoryId, CategoryScore, CollegeRef, CollegeScores, ComparisonRequest,
    ComparisonResult, JobId, JobStatus, SavedComparison,
};
pub use crate::domain::ports::{
    AuthProvider, CollegeDirectory, ConfigProvider, Evaluator, HistoryRepo, Storage,
};
pub use crate::utils::error::Result;
