use crate::domain::model::{
    Category, CollegeRef, ComparisonRequest, ComparisonResult, JobId, JobStatus, SavedComparison,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Remote scoring service. Submission returns an opaque job id which is then
/// polled to a terminal status; `abandon` is a best-effort courtesy call on
/// cancellation.
#[async_trait]
pub trait Evaluator: Send + Sync {
    async fn submit(&self, request: &ComparisonRequest) -> Result<JobId>;
    async fn status(&self, job: &JobId) -> Result<JobStatus>;
    async fn abandon(&self, job: &JobId) -> Result<()>;
}

/// Durable record store for saved comparisons, scoped server-side to the
/// authenticated identity.
#[async_trait]
pub trait HistoryRepo: Send + Sync {
    async fn create(
        &self,
        name: &str,
        categories: &[Category],
        colleges: &[CollegeRef],
        results: &ComparisonResult,
    ) -> Result<String>;
    async fn list(&self) -> Result<Vec<SavedComparison>>;
    async fn rename(&self, id: &str, name: &str) -> Result<()>;
    async fn delete(&self, id: &str) -> Result<()>;
}

/// College search backend. Returns at most `limit` matches.
#[async_trait]
pub trait CollegeDirectory: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<CollegeRef>>;
}

/// Opaque authentication predicate. History mutations require it.
pub trait AuthProvider: Send + Sync {
    fn is_authenticated(&self) -> bool;
}

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn output_path(&self) -> &str;
    fn search_limit(&self) -> usize;
    fn debounce_ms(&self) -> u64;
    fn poll_interval_secs(&self) -> u64;
    fn retry_backoff_secs(&self) -> u64;
    fn max_poll_attempts(&self) -> u32;
}
