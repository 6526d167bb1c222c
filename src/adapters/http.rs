use reqwest::Client;
use serde_json::{json, Value};

use crate::domain::model::{
    Category, CollegeRef, ComparisonRequest, ComparisonResult, JobId, JobStatus, SavedComparison,
};
use crate::domain::ports::{AuthProvider, CollegeDirectory, Evaluator, HistoryRepo};
use crate::utils::error::{CompareError, Result};
use async_trait::async_trait;

/// HTTP client for the comparison service: evaluator jobs, the saved
/// comparison store, and college search all live behind one base URL.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

/// A request that got no response (connection refused/reset, timeout) is a
/// transient network failure; a response with an error status is a real API
/// error and terminal for the caller.
fn classify(e: reqwest::Error) -> CompareError {
    if e.is_connect() || e.is_timeout() {
        CompareError::NetworkError {
            message: e.to_string(),
        }
    } else {
        CompareError::ApiError(e)
    }
}

/// History operations are not retried, so every failure (including a missing
/// response) surfaces as a persistence error banner.
fn persistence(e: reqwest::Error) -> CompareError {
    CompareError::PersistenceError {
        message: e.to_string(),
    }
}

/// Decodes the evaluator's duck-typed status payload into the `JobStatus`
/// union. The order matters: an explicit failure flag wins, then a result
/// body, and anything else is still pending.
pub fn decode_status(value: Value) -> Result<JobStatus> {
    if value.get("failed").and_then(Value::as_bool).unwrap_or(false) {
        let message = value
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("evaluation failed")
            .to_string();
        return Ok(JobStatus::Failed(message));
    }
    if value.get("entities").is_some() {
        let result: ComparisonResult = serde_json::from_value(value)?;
        return Ok(JobStatus::Complete(result));
    }
    match value.get("status").and_then(Value::as_str) {
        Some("queued") => Ok(JobStatus::Queued),
        _ => Ok(JobStatus::Running),
    }
}

#[async_trait]
impl Evaluator for ApiClient {
    async fn submit(&self, request: &ComparisonRequest) -> Result<JobId> {
        let body = json!({
            "entityIds": request.college_ids,
            "categories": request.categories,
        });
        tracing::debug!("submitting comparison for {} colleges", request.college_ids.len());

        let response = self
            .authorized(self.client.post(self.url("/compare/jobs")))
            .json(&body)
            .send()
            .await
            .map_err(classify)?
            .error_for_status()
            .map_err(CompareError::ApiError)?;

        let payload: Value = response.json().await.map_err(classify)?;
        if let Some(job_id) = payload.get("jobId").and_then(Value::as_str) {
            return Ok(JobId(job_id.to_string()));
        }
        let message = payload
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("evaluator did not return a job id")
            .to_string();
        Err(CompareError::JobFailedError { message })
    }

    async fn status(&self, job: &JobId) -> Result<JobStatus> {
        let response = self
            .authorized(self.client.get(self.url(&format!("/compare/jobs/{}", job))))
            .send()
            .await
            .map_err(classify)?
            .error_for_status()
            .map_err(CompareError::ApiError)?;

        let payload: Value = response.json().await.map_err(classify)?;
        decode_status(payload)
    }

    async fn abandon(&self, job: &JobId) -> Result<()> {
        self.authorized(
            self.client
                .delete(self.url(&format!("/compare/jobs/{}", job))),
        )
        .send()
        .await
        .map_err(classify)?
        .error_for_status()
        .map_err(CompareError::ApiError)?;
        Ok(())
    }
}

#[async_trait]
impl HistoryRepo for ApiClient {
    async fn create(
        &self,
        name: &str,
        categories: &[Category],
        colleges: &[CollegeRef],
        results: &ComparisonResult,
    ) -> Result<String> {
        let body = json!({
            "name": name,
            "entityIds": colleges.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(),
            "categories": categories,
            "entities": colleges,
            "results": results,
        });

        let response = self
            .authorized(self.client.post(self.url("/comparisons")))
            .json(&body)
            .send()
            .await
            .map_err(persistence)?
            .error_for_status()
            .map_err(persistence)?;

        let payload: Value = response.json().await.map_err(persistence)?;
        payload
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| CompareError::PersistenceError {
                message: "store did not return an id".to_string(),
            })
    }

    async fn list(&self) -> Result<Vec<SavedComparison>> {
        let response = self
            .authorized(self.client.get(self.url("/comparisons")))
            .send()
            .await
            .map_err(persistence)?
            .error_for_status()
            .map_err(persistence)?;

        response
            .json()
            .await
            .map_err(persistence)
    }

    async fn rename(&self, id: &str, name: &str) -> Result<()> {
        self.authorized(self.client.patch(self.url(&format!("/comparisons/{}", id))))
            .json(&json!({ "name": name }))
            .send()
            .await
            .map_err(persistence)?
            .error_for_status()
            .map_err(persistence)?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.authorized(
            self.client
                .delete(self.url(&format!("/comparisons/{}", id))),
        )
        .send()
        .await
        .map_err(persistence)?
        .error_for_status()
        .map_err(persistence)?;
        Ok(())
    }
}

#[async_trait]
impl CollegeDirectory for ApiClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<CollegeRef>> {
        let response = self
            .authorized(self.client.get(self.url("/colleges/search")))
            .query(&[("query", query), ("limit", &limit.to_string())])
            .send()
            .await
            .map_err(classify)?
            .error_for_status()
            .map_err(CompareError::ApiError)?;

        response.json().await.map_err(classify)
    }
}

impl AuthProvider for ApiClient {
    fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}
