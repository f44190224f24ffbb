//! `ureq` client for the experiment service's JSON API.

use std::time::{Duration, Instant};

use serde::Deserialize;

use super::{CancellationToken, ConnectivityStatus, ExperimentService};
use crate::experiment::{ExperimentError, ExperimentRequest, ExperimentResult};
use crate::http_client;

/// Liveness endpoint; any 2xx answer means the service is up.
pub const PROBE_PATH: &str = "/api/models";
/// Experiment endpoint accepting an [`ExperimentRequest`] body.
pub const EXPERIMENT_PATH: &str = "/api/experiment";

/// Results carry three base64 PNG plots, so allow generous bodies.
const MAX_RESULT_BYTES: usize = 32 * 1024 * 1024;
const MAX_ERROR_BYTES: usize = 64 * 1024;

/// Experiment service reached over HTTP.
#[derive(Clone, Debug)]
pub struct HttpService {
    base_url: String,
    probe_timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

impl HttpService {
    pub fn new(base_url: &str, probe_timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            probe_timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl ExperimentService for HttpService {
    fn probe(&self) -> ConnectivityStatus {
        let url = self.url(PROBE_PATH);
        match http_client::agent()
            .get(&url)
            .timeout(self.probe_timeout)
            .call()
        {
            Ok(response) if (200..300).contains(&response.status()) => {
                tracing::info!(url = %url, "Backend is online");
                ConnectivityStatus::Online
            }
            Ok(response) => {
                tracing::warn!(status = response.status(), "Backend responded with non-success status");
                ConnectivityStatus::Offline
            }
            Err(ureq::Error::Status(status, _)) => {
                tracing::warn!(status, "Backend responded with error status");
                ConnectivityStatus::Offline
            }
            Err(ureq::Error::Transport(err)) => {
                tracing::warn!(error = %err, "Backend is offline or unreachable");
                ConnectivityStatus::Offline
            }
        }
    }

    fn run_experiment(
        &self,
        request: &ExperimentRequest,
        cancel: &CancellationToken,
    ) -> Result<ExperimentResult, ExperimentError> {
        let remaining = cancel.remaining();
        if remaining.is_zero() {
            return Err(ExperimentError::Timeout);
        }
        let response = match http_client::agent()
            .post(&self.url(EXPERIMENT_PATH))
            .set("Accept", "application/json")
            .timeout(remaining)
            .send_json(request)
        {
            Ok(response) => response,
            Err(ureq::Error::Status(status, response)) => {
                let body = http_client::read_body_limited(response, MAX_ERROR_BYTES).ok();
                return Err(map_status_error(status, body.as_deref()));
            }
            Err(ureq::Error::Transport(err)) => {
                return Err(transport_error(cancel, err.to_string()));
            }
        };

        let status = response.status();
        if !(200..300).contains(&status) {
            let body = http_client::read_body_limited(response, MAX_ERROR_BYTES).ok();
            return Err(map_status_error(status, body.as_deref()));
        }
        let body = http_client::read_body_limited(response, MAX_RESULT_BYTES).map_err(|err| {
            if cancel.is_expired_at(Instant::now()) {
                ExperimentError::Timeout
            } else {
                ExperimentError::MalformedResponse(err)
            }
        })?;
        ExperimentResult::from_json(&body)
    }
}

/// Build a `ServerError`, keeping the service's `{"error": ..}` text when present.
pub(crate) fn map_status_error(status: u16, body: Option<&str>) -> ExperimentError {
    ExperimentError::ServerError {
        status,
        message: body.and_then(parse_error_message),
    }
}

fn parse_error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body.trim()).ok()?;
    parsed
        .error
        .map(|message| message.trim().to_string())
        .filter(|message| !message.is_empty())
}

fn transport_error(cancel: &CancellationToken, message: String) -> ExperimentError {
    if cancel.is_expired_at(Instant::now()) {
        ExperimentError::Timeout
    } else {
        ExperimentError::Transport(message)
    }
}
