use std::time::Duration;

use campus_compare::{
    ApiClient, CancelSource, Category, CompareError, ComparisonRequest, JobClient, JobState,
    PollPolicy,
};
use httpmock::prelude::*;
use serde_json::json;

fn request() -> ComparisonRequest {
    ComparisonRequest {
        college_ids: vec!["mit".to_string(), "stanford".to_string()],
        categories: vec![
            Category {
                id: 0,
                name: "Academics".to_string(),
                weight: 5,
            },
            Category {
                id: 1,
                name: "Location".to_string(),
                weight: 2,
            },
        ],
    }
}

fn fast_policy(max_attempts: u32) -> PollPolicy {
    PollPolicy {
        interval: Duration::from_millis(5),
        transient_backoff: Duration::from_millis(5),
        max_attempts,
    }
}

#[tokio::test]
async fn test_submit_and_poll_to_completion_over_http() {
    let server = MockServer::start();

    let submit_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/compare/jobs")
            .json_body_partial(r#"{"entityIds": ["mit", "stanford"]}"#);
        then.status(200).json_body(json!({"jobId": "job-42"}));
    });

    let status_mock = server.mock(|when, then| {
        when.method(GET).path("/compare/jobs/job-42");
        then.status(200).json_body(json!({
            "entities": [
                {
                    "ref": {"id": "mit", "name": "MIT", "state": "MA"},
                    "totalScore": 8.9,
                    "scoresByCategory": {
                        "Academics": {"score": 9.5, "reasoning": "exceptional faculty"},
                        "Location": {"score": 6.0, "reasoning": "dense urban campus"}
                    }
                },
                {
                    "ref": {"id": "stanford", "name": "Stanford University", "state": "CA"},
                    "totalScore": 8.4,
                    "scoresByCategory": {
                        "Academics": {"score": 9.0, "reasoning": "top programs"},
                        "Location": {"score": 7.5, "reasoning": "suburban campus"}
                    }
                }
            ],
            "summary": "MIT edges ahead on academics"
        }));
    });

    let api = ApiClient::new(&server.base_url(), None);
    let mut client = JobClient::new(api, fast_policy(150));
    let cancel = CancelSource::new();

    let result = client.run(&request(), &cancel.token()).await.unwrap();

    submit_mock.assert();
    status_mock.assert();
    assert_eq!(result.entities.len(), 2);
    assert!(result.entities[0].scores_by_category.contains_key("Academics"));
    assert!(result.entities[0].scores_by_category.contains_key("Location"));
    assert_eq!(*client.state(), JobState::Complete);
}

#[tokio::test]
async fn test_failure_payload_surfaces_server_message() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(POST).path("/compare/jobs");
        then.status(200).json_body(json!({"jobId": "job-7"}));
    });
    let status_mock = server.mock(|when, then| {
        when.method(GET).path("/compare/jobs/job-7");
        then.status(200)
            .json_body(json!({"failed": true, "error": "scoring backend unavailable"}));
    });

    let api = ApiClient::new(&server.base_url(), None);
    let mut client = JobClient::new(api, fast_policy(150));
    let cancel = CancelSource::new();

    let err = client.run(&request(), &cancel.token()).await.unwrap_err();

    match err {
        CompareError::JobFailedError { message } => {
            assert_eq!(message, "scoring backend unavailable")
        }
        other => panic!("unexpected error: {:?}", other),
    }
    status_mock.assert_hits(1);
    assert_eq!(*client.state(), JobState::Failed);
}

#[tokio::test]
async fn test_non_2xx_status_is_terminal_not_retried() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(POST).path("/compare/jobs");
        then.status(200).json_body(json!({"jobId": "job-9"}));
    });
    let status_mock = server.mock(|when, then| {
        when.method(GET).path("/compare/jobs/job-9");
        then.status(500);
    });

    let api = ApiClient::new(&server.base_url(), None);
    let mut client = JobClient::new(api, fast_policy(150));
    let cancel = CancelSource::new();

    let err = client.run(&request(), &cancel.token()).await.unwrap_err();

    assert!(matches!(err, CompareError::ApiError(_)));
    status_mock.assert_hits(1);
    assert_eq!(*client.state(), JobState::Failed);
}

#[tokio::test]
async fn test_submit_error_payload_fails_without_polling() {
    let server = MockServer::start();

    let submit_mock = server.mock(|when, then| {
        when.method(POST).path("/compare/jobs");
        then.status(200)
            .json_body(json!({"error": "evaluation quota exceeded"}));
    });

    let api = ApiClient::new(&server.base_url(), None);
    let mut client = JobClient::new(api, fast_policy(150));

    let err = client.submit(&request()).await.unwrap_err();

    match err {
        CompareError::JobFailedError { message } => {
            assert_eq!(message, "evaluation quota exceeded")
        }
        other => panic!("unexpected error: {:?}", other),
    }
    submit_mock.assert();
    assert_eq!(*client.state(), JobState::Failed);
}

#[tokio::test]
async fn test_pending_payload_keeps_polling_until_ceiling() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(POST).path("/compare/jobs");
        then.status(200).json_body(json!({"jobId": "job-3"}));
    });
    let status_mock = server.mock(|when, then| {
        when.method(GET).path("/compare/jobs/job-3");
        then.status(200).json_body(json!({"status": "running", "progress": 10}));
    });

    let api = ApiClient::new(&server.base_url(), None);
    let mut client = JobClient::new(api, fast_policy(4));
    let cancel = CancelSource::new();

    let err = client.run(&request(), &cancel.token()).await.unwrap_err();

    assert!(matches!(err, CompareError::TimedOutError { attempts: 4 }));
    status_mock.assert_hits(4);
    assert_eq!(*client.state(), JobState::TimedOut);
}

#[tokio::test]
async fn test_connection_error_classified_as_transient() {
    use campus_compare::domain::ports::Evaluator;
    use campus_compare::JobId;

    // Bind a port, then drop it so nothing is listening.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let api = ApiClient::new(&format!("http://127.0.0.1:{}", port), None);
    let err = api.status(&JobId("job-1".to_string())).await.unwrap_err();

    assert!(err.is_transient(), "connection refused must be transient: {:?}", err);
}
