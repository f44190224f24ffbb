mod support;

use std::sync::Arc;
use std::time::{Duration, Instant};

use prefixlab::backend::{
    CancellationToken, ConnectivityStatus, EXPERIMENT_PATH, ExperimentService, HttpService,
    PROBE_PATH,
};
use prefixlab::experiment::{ExperimentError, ExperimentRequest};
use prefixlab::session::{EXPERIMENT_TIMEOUT, Session, SessionState};
use serde_json::{Value, json};
use support::poll_until;
use support::stub_server::{StubServer, unreachable_url};

fn result_body() -> Value {
    json!({
        "full_text": {
            "accuracy": 0.91,
            "precision": 0.9,
            "recall": 0.92,
            "f1_score": 0.91,
            "confusion_matrix": [[182, 18], [18, 182]]
        },
        "prefix": {
            "accuracy": 0.87,
            "precision": 0.86,
            "recall": 0.88,
            "f1_score": 0.87,
            "confusion_matrix": [[174, 26], [26, 174]]
        },
        "performance_retention": 95.6,
        "prefix_length": 50,
        "dataset_size": 2000,
        "train_size": 1600,
        "test_size": 400,
        "label_names": ["negative", "positive"],
        "plots": {
            "comparison": "iVBORw0KGgo=",
            "confusion_full": "iVBORw0KGgo=",
            "confusion_prefix": "iVBORw0KGgo="
        }
    })
}

fn online_stub() -> StubServer {
    StubServer::start().route("GET", PROBE_PATH, 200, json!([]).to_string())
}

fn started(base_url: &str) -> Session {
    let service = HttpService::new(base_url, Duration::from_secs(2));
    let mut session = Session::new(Arc::new(service), EXPERIMENT_TIMEOUT);
    session.start();
    poll_until(&mut session, |s| matches!(s.state(), SessionState::Ready(_)));
    session
}

fn run(session: &mut Session, prefix_length: i64) {
    session.request_run(ExperimentRequest::build("imdb", "logistic", prefix_length));
    poll_until(session, |s| !s.state().is_busy());
}

#[test]
fn successful_run_round_trips_through_http() {
    let server = online_stub().route("POST", EXPERIMENT_PATH, 200, result_body().to_string());
    let mut session = started(server.base_url());
    assert_eq!(session.connectivity(), ConnectivityStatus::Online);

    run(&mut session, 50);

    let result = session.state().result().expect("succeeded");
    assert!((result.performance_retention - 95.6).abs() < 1e-9);
    assert_eq!(result.label_names.len(), 2);
    assert_eq!(result.prefix_length, 50);

    let sent = server.requests_to(EXPERIMENT_PATH);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].method, "POST");
    let payload: Value = serde_json::from_str(&sent[0].body).unwrap();
    assert_eq!(
        payload,
        json!({"dataset": "imdb", "model": "logistic", "prefixLength": 50})
    );
}

#[test]
fn response_missing_label_names_is_malformed() {
    let mut body = result_body();
    body.as_object_mut().unwrap().remove("label_names");
    let server = online_stub().route("POST", EXPERIMENT_PATH, 200, body.to_string());
    let mut session = started(server.base_url());

    run(&mut session, 50);

    assert!(matches!(
        session.state(),
        SessionState::Failed(ExperimentError::MalformedResponse(_))
    ));
}

#[test]
fn server_error_surfaces_service_message() {
    let server = online_stub().route(
        "POST",
        EXPERIMENT_PATH,
        500,
        json!({"error": "Dataset not loaded"}).to_string(),
    );
    let mut session = started(server.base_url());

    run(&mut session, 50);

    let err = session.state().error().expect("failed");
    assert_eq!(
        err,
        &ExperimentError::ServerError {
            status: 500,
            message: Some("Dataset not loaded".into()),
        }
    );
    assert_eq!(err.to_string(), "Dataset not loaded");
}

#[test]
fn server_error_without_message_reports_status() {
    let server = online_stub().route("POST", EXPERIMENT_PATH, 503, "");
    let mut session = started(server.base_url());

    run(&mut session, 50);

    let err = session.state().error().expect("failed");
    assert_eq!(err.to_string(), "Server error: 503");
}

#[test]
fn failed_run_can_be_rerun() {
    let server = online_stub().route("POST", EXPERIMENT_PATH, 500, "");
    let mut session = started(server.base_url());
    run(&mut session, 50);
    assert!(matches!(session.state(), SessionState::Failed(_)));

    run(&mut session, 50);

    assert!(matches!(session.state(), SessionState::Failed(_)));
    assert_eq!(server.requests_to(EXPERIMENT_PATH).len(), 2);
}

#[test]
fn non_success_probe_marks_backend_offline() {
    let server = StubServer::start().route("GET", PROBE_PATH, 503, "");
    let session = started(server.base_url());

    assert_eq!(session.state(), &SessionState::Ready(ConnectivityStatus::Offline));
}

#[test]
fn unreachable_backend_blocks_runs_without_calling_it() {
    let mut session = started(&unreachable_url());
    assert_eq!(session.connectivity(), ConnectivityStatus::Offline);

    session.request_run(ExperimentRequest::build("imdb", "logistic", 50));

    assert_eq!(
        session.state(),
        &SessionState::Failed(ExperimentError::BackendOffline)
    );
    assert!(!session.has_pending_work());
}

#[test]
fn retry_after_backend_comes_up_goes_online() {
    let server = StubServer::start().route("GET", PROBE_PATH, 503, "");
    let mut session = started(server.base_url());
    assert_eq!(session.connectivity(), ConnectivityStatus::Offline);

    let server = server.route("GET", PROBE_PATH, 200, "[]");
    session.retry_connectivity();
    assert_eq!(session.state(), &SessionState::Probing);
    poll_until(&mut session, |s| matches!(s.state(), SessionState::Ready(_)));

    assert_eq!(session.connectivity(), ConnectivityStatus::Online);
    assert_eq!(server.requests_to(PROBE_PATH).len(), 2);
}

#[test]
fn invalid_request_never_reaches_the_service() {
    let server = online_stub();
    let mut session = started(server.base_url());

    session.request_run(ExperimentRequest::build("imdb", "logistic", 7));

    assert!(matches!(
        session.state(),
        SessionState::Failed(ExperimentError::Validation(_))
    ));
    assert!(server.requests_to(EXPERIMENT_PATH).is_empty());
}

#[test]
fn silent_backend_probe_reports_offline_within_bound() {
    let server = StubServer::start().hold("GET", PROBE_PATH);
    let service = HttpService::new(server.base_url(), Duration::from_millis(300));

    let started = Instant::now();
    let status = service.probe();

    assert_eq!(status, ConnectivityStatus::Offline);
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(server.held_count(), 1);
}

#[test]
fn silent_experiment_call_maps_to_timeout() {
    let server = online_stub().hold("POST", EXPERIMENT_PATH);
    let service = HttpService::new(server.base_url(), Duration::from_secs(2));
    let request = ExperimentRequest::build("imdb", "logistic", 50).unwrap();
    let token = CancellationToken::with_timeout(Duration::from_millis(400));

    let started = Instant::now();
    let outcome = service.run_experiment(&request, &token);

    assert_eq!(outcome.unwrap_err(), ExperimentError::Timeout);
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[test]
fn stalled_body_maps_to_timeout() {
    let server = online_stub().stall_body("POST", EXPERIMENT_PATH);
    let service = HttpService::new(server.base_url(), Duration::from_secs(2));
    let request = ExperimentRequest::build("imdb", "logistic", 50).unwrap();
    let token = CancellationToken::with_timeout(Duration::from_millis(400));

    let outcome = service.run_experiment(&request, &token);

    assert_eq!(outcome.unwrap_err(), ExperimentError::Timeout);
}

#[test]
fn silent_experiment_call_times_out_and_late_reply_is_ignored() {
    let server = online_stub().hold("POST", EXPERIMENT_PATH);
    let service = HttpService::new(server.base_url(), Duration::from_secs(2));
    let mut session = Session::new(Arc::new(service), Duration::from_secs(1));
    session.start();
    poll_until(&mut session, |s| matches!(s.state(), SessionState::Ready(_)));

    run(&mut session, 50);

    assert_eq!(
        session.state(),
        &SessionState::Failed(ExperimentError::Timeout)
    );
    assert_eq!(server.requests_to(EXPERIMENT_PATH).len(), 1);

    server.answer_held(200, &result_body().to_string());
    std::thread::sleep(Duration::from_millis(200));
    session.poll();

    assert_eq!(
        session.state(),
        &SessionState::Failed(ExperimentError::Timeout)
    );
    assert!(!session.has_pending_work());
}
