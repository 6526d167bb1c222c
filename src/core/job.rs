use std::time::Duration;

use tokio::sync::watch;

use crate::domain::model::{ComparisonRequest, ComparisonResult, JobId, JobStatus};
use crate::domain::ports::Evaluator;
use crate::utils::error::{CompareError, Result};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_TRANSIENT_BACKOFF: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_ATTEMPTS: u32 = 150;

/// Polling cadence. Transient network errors get a longer backoff than
/// ordinary "still running" polls; the attempt ceiling bounds the otherwise
/// indefinite retry loop.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    pub interval: Duration,
    pub transient_backoff: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            transient_backoff: DEFAULT_TRANSIENT_BACKOFF,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl PollPolicy {
    pub fn from_config(config: &impl crate::domain::ports::ConfigProvider) -> Self {
        Self {
            interval: Duration::from_secs(config.poll_interval_secs()),
            transient_backoff: Duration::from_secs(config.retry_backoff_secs()),
            max_attempts: config.max_poll_attempts(),
        }
    }
}

/// Cancellation pair over a watch channel. The source side lives with the
/// caller (the CLI wires Ctrl-C to it); tokens are cheap clones handed into
/// the polling loop.
#[derive(Debug)]
pub struct CancelSource {
    tx: watch::Sender<bool>,
}

#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelSource {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn token(&self) -> CancelToken {
        CancelToken {
            rx: self.tx.subscribe(),
        }
    }

    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

impl Default for CancelSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves when cancellation is requested. Never resolves if the source
    /// is dropped without cancelling.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow() {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum JobState {
    #[default]
    Idle,
    Submitting,
    Polling(JobId),
    Complete,
    Failed,
    TimedOut,
}

/// Owns one evaluation job at a time from submission to a terminal state.
///
/// The job itself is never persisted; only its terminal result may be, via
/// the history store.
pub struct JobClient<E: Evaluator> {
    evaluator: E,
    policy: PollPolicy,
    state: JobState,
}

impl<E: Evaluator> JobClient<E> {
    pub fn new(evaluator: E, policy: PollPolicy) -> Self {
        Self {
            evaluator,
            policy,
            state: JobState::Idle,
        }
    }

    pub fn state(&self) -> &JobState {
        &self.state
    }

    /// Validates the request invariants, then submits. Rejected outright
    /// while another job is in flight; a remote error is terminal.
    pub async fn submit(&mut self, request: &ComparisonRequest) -> Result<JobId> {
        if matches!(self.state, JobState::Submitting | JobState::Polling(_)) {
            return Err(CompareError::JobInFlightError);
        }
        request.validate()?;

        self.state = JobState::Submitting;
        match self.evaluator.submit(request).await {
            Ok(job_id) => {
                tracing::info!("evaluation job {} accepted", job_id);
                self.state = JobState::Polling(job_id.clone());
                Ok(job_id)
            }
            Err(e) => {
                tracing::error!("job submission failed: {}", e);
                self.state = JobState::Failed;
                Err(e)
            }
        }
    }

    /// Polls the submitted job to a terminal state.
    ///
    /// Transient network failures are absorbed with the longer backoff and
    /// retried; an explicit failure payload or API error is terminal; the
    /// attempt ceiling surfaces as `TimedOut`. Cancellation tears the loop
    /// down, best-effort abandons the remote job, and resets to `Idle`.
    pub async fn wait(&mut self, cancel: &CancelToken) -> Result<ComparisonResult> {
        let job_id = match &self.state {
            JobState::Polling(id) => id.clone(),
            _ => {
                return Err(CompareError::ValidationError {
                    message: "no submitted job to wait for".to_string(),
                })
            }
        };

        let mut attempts: u32 = 0;
        loop {
            if cancel.is_cancelled() {
                return self.teardown(&job_id).await;
            }
            if attempts >= self.policy.max_attempts {
                tracing::warn!("job {} still pending after {} status checks", job_id, attempts);
                self.state = JobState::TimedOut;
                return Err(CompareError::TimedOutError { attempts });
            }
            attempts += 1;

            match self.evaluator.status(&job_id).await {
                Ok(JobStatus::Complete(result)) => {
                    tracing::info!("job {} complete after {} status checks", job_id, attempts);
                    self.state = JobState::Complete;
                    return Ok(result);
                }
                Ok(JobStatus::Failed(message)) => {
                    tracing::error!("job {} failed: {}", job_id, message);
                    self.state = JobState::Failed;
                    return Err(CompareError::JobFailedError { message });
                }
                Ok(JobStatus::Queued) | Ok(JobStatus::Running) => {
                    if self.pause(self.policy.interval, cancel).await.is_err() {
                        return self.teardown(&job_id).await;
                    }
                }
                Err(e) if e.is_transient() => {
                    tracing::warn!("job {} status check lost to the network: {}", job_id, e);
                    if self.pause(self.policy.transient_backoff, cancel).await.is_err() {
                        return self.teardown(&job_id).await;
                    }
                }
                Err(e) => {
                    tracing::error!("job {} status check rejected: {}", job_id, e);
                    self.state = JobState::Failed;
                    return Err(e);
                }
            }
        }
    }

    /// Submit-and-wait convenience used by the session.
    pub async fn run(
        &mut self,
        request: &ComparisonRequest,
        cancel: &CancelToken,
    ) -> Result<ComparisonResult> {
        self.submit(request).await?;
        self.wait(cancel).await
    }

    async fn pause(&self, duration: Duration, cancel: &CancelToken) -> Result<()> {
        tokio::select! {
            _ = tokio::time::sleep(duration) => Ok(()),
            _ = cancel.cancelled() => Err(CompareError::CancelledError),
        }
    }

    async fn teardown(&mut self, job_id: &JobId) -> Result<ComparisonResult> {
        tracing::info!("cancelling poll loop for job {}", job_id);
        if let Err(e) = self.evaluator.abandon(job_id).await {
            tracing::debug!("could not abandon job {}: {}", job_id, e);
        }
        self.state = JobState::Idle;
        Err(CompareError::CancelledError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Category;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    enum Script {
        Transient,
        Pending,
        Complete,
        Fail(&'static str),
    }

    struct ScriptedEvaluator {
        script: Mutex<VecDeque<Script>>,
        submit_calls: AtomicUsize,
        status_calls: AtomicUsize,
        abandoned: AtomicBool,
    }

    impl ScriptedEvaluator {
        fn new(script: Vec<Script>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                submit_calls: AtomicUsize::new(0),
                status_calls: AtomicUsize::new(0),
                abandoned: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl Evaluator for ScriptedEvaluator {
        async fn submit(&self, _request: &ComparisonRequest) -> Result<JobId> {
            self.submit_calls.fetch_add(1, Ordering::SeqCst);
            Ok(JobId("job-1".to_string()))
        }

        async fn status(&self, _job: &JobId) -> Result<JobStatus> {
            self.status_calls.fetch_add(1, Ordering::SeqCst);
            let step = self.script.lock().unwrap().pop_front();
            match step {
                Some(Script::Transient) | None => Err(CompareError::NetworkError {
                    message: "connection reset".to_string(),
                }),
                Some(Script::Pending) => Ok(JobStatus::Running),
                Some(Script::Complete) => Ok(JobStatus::Complete(ComparisonResult {
                    entities: vec![],
                    summary: None,
                })),
                Some(Script::Fail(message)) => Ok(JobStatus::Failed(message.to_string())),
            }
        }

        async fn abandon(&self, _job: &JobId) -> Result<()> {
            self.abandoned.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    fn fast_policy() -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(1),
            transient_backoff: Duration::from_millis(2),
            max_attempts: 150,
        }
    }

    fn request(ids: &[&str]) -> ComparisonRequest {
        ComparisonRequest {
            college_ids: ids.iter().map(|s| s.to_string()).collect(),
            categories: vec![Category {
                id: 0,
                name: "Academics".to_string(),
                weight: 5,
            }],
        }
    }

    #[tokio::test]
    async fn test_transient_errors_absorbed_then_complete() {
        let evaluator = ScriptedEvaluator::new(vec![
            Script::Transient,
            Script::Transient,
            Script::Pending,
            Script::Complete,
        ]);
        let mut client = JobClient::new(evaluator, fast_policy());
        let cancel = CancelSource::new();

        let result = client.run(&request(&["mit", "stanford"]), &cancel.token()).await;

        assert!(result.is_ok());
        assert_eq!(client.evaluator.status_calls.load(Ordering::SeqCst), 4);
        assert_eq!(*client.state(), JobState::Complete);
    }

    #[tokio::test]
    async fn test_pending_polls_until_complete() {
        let evaluator =
            ScriptedEvaluator::new(vec![Script::Pending, Script::Pending, Script::Complete]);
        let mut client = JobClient::new(evaluator, fast_policy());
        let cancel = CancelSource::new();

        let result = client.run(&request(&["mit", "stanford"]), &cancel.token()).await;

        assert!(result.is_ok());
        assert_eq!(client.evaluator.status_calls.load(Ordering::SeqCst), 3);
        assert_eq!(*client.state(), JobState::Complete);
    }

    #[tokio::test]
    async fn test_explicit_failure_is_terminal_after_one_attempt() {
        let evaluator = ScriptedEvaluator::new(vec![Script::Fail("model overloaded")]);
        let mut client = JobClient::new(evaluator, fast_policy());
        let cancel = CancelSource::new();

        let err = client
            .run(&request(&["mit", "stanford"]), &cancel.token())
            .await
            .unwrap_err();

        match err {
            CompareError::JobFailedError { message } => assert_eq!(message, "model overloaded"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(client.evaluator.status_calls.load(Ordering::SeqCst), 1);
        assert_eq!(*client.state(), JobState::Failed);
    }

    #[tokio::test]
    async fn test_too_few_colleges_rejected_before_any_network_call() {
        let evaluator = ScriptedEvaluator::new(vec![]);
        let mut client = JobClient::new(evaluator, fast_policy());

        let err = client.submit(&request(&["mit"])).await.unwrap_err();

        assert!(matches!(err, CompareError::ValidationError { .. }));
        assert_eq!(client.evaluator.submit_calls.load(Ordering::SeqCst), 0);
        assert_eq!(*client.state(), JobState::Idle);
    }

    #[tokio::test]
    async fn test_duplicate_ids_do_not_count_as_distinct() {
        let evaluator = ScriptedEvaluator::new(vec![]);
        let mut client = JobClient::new(evaluator, fast_policy());

        let err = client.submit(&request(&["mit", "mit"])).await.unwrap_err();

        assert!(matches!(err, CompareError::ValidationError { .. }));
        assert_eq!(client.evaluator.submit_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_second_submit_rejected_while_polling() {
        let evaluator = ScriptedEvaluator::new(vec![]);
        let mut client = JobClient::new(evaluator, fast_policy());

        client.submit(&request(&["mit", "stanford"])).await.unwrap();
        let err = client.submit(&request(&["mit", "stanford"])).await.unwrap_err();

        assert!(matches!(err, CompareError::JobInFlightError));
        assert_eq!(client.evaluator.submit_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_attempt_ceiling_times_out() {
        let evaluator = ScriptedEvaluator::new(vec![]); // every status check is transient
        let mut client = JobClient::new(
            evaluator,
            PollPolicy {
                interval: Duration::from_millis(1),
                transient_backoff: Duration::from_millis(1),
                max_attempts: 3,
            },
        );
        let cancel = CancelSource::new();

        let err = client
            .run(&request(&["mit", "stanford"]), &cancel.token())
            .await
            .unwrap_err();

        assert!(matches!(err, CompareError::TimedOutError { attempts: 3 }));
        assert_eq!(client.evaluator.status_calls.load(Ordering::SeqCst), 3);
        assert_eq!(*client.state(), JobState::TimedOut);
    }

    #[tokio::test]
    async fn test_cancellation_stops_polling_and_abandons_job() {
        let evaluator = ScriptedEvaluator::new(vec![
            Script::Pending,
            Script::Pending,
            Script::Pending,
            Script::Pending,
        ]);
        let mut client = JobClient::new(
            evaluator,
            PollPolicy {
                interval: Duration::from_millis(50),
                transient_backoff: Duration::from_millis(50),
                max_attempts: 150,
            },
        );
        let source = CancelSource::new();
        let token = source.token();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            source.cancel();
        });

        let err = client
            .run(&request(&["mit", "stanford"]), &token)
            .await
            .unwrap_err();

        assert!(matches!(err, CompareError::CancelledError));
        assert!(client.evaluator.abandoned.load(Ordering::SeqCst));
        assert_eq!(*client.state(), JobState::Idle);
    }

    #[tokio::test]
    async fn test_submit_error_is_terminal_failed() {
        struct RejectingEvaluator;

        #[async_trait]
        impl Evaluator for RejectingEvaluator {
            async fn submit(&self, _request: &ComparisonRequest) -> Result<JobId> {
                Err(CompareError::JobFailedError {
                    message: "quota exceeded".to_string(),
                })
            }
            async fn status(&self, _job: &JobId) -> Result<JobStatus> {
                unreachable!("status must not be called after a rejected submit")
            }
            async fn abandon(&self, _job: &JobId) -> Result<()> {
                Ok(())
            }
        }

        let mut client = JobClient::new(RejectingEvaluator, fast_policy());
        let err = client.submit(&request(&["mit", "stanford"])).await.unwrap_err();

        assert!(matches!(err, CompareError::JobFailedError { .. }));
        assert_eq!(*client.state(), JobState::Failed);
    }
}
