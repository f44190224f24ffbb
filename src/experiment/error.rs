//! Failure taxonomy for experiment runs.

use super::request::ValidationError;

/// Every way an experiment run can end without a result.
///
/// The display text is the message shown to the user in the failed state.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExperimentError {
    /// The last probe reported the service unreachable; no call was attempted.
    #[error("Backend server is offline. Start the backend server, then retry the connection.")]
    BackendOffline,
    /// The experiment call exceeded its time bound and was cancelled.
    #[error("Request timeout. The experiment took too long to complete.")]
    Timeout,
    /// The service answered with a non-2xx status.
    #[error("{}", server_error_text(*.status, .message.as_deref()))]
    ServerError { status: u16, message: Option<String> },
    /// The service answered 2xx but the body is not a valid result.
    #[error("Malformed experiment response: {0}")]
    MalformedResponse(String),
    /// The submission failed local checks before being sent.
    #[error("Invalid experiment request: {0}")]
    Validation(#[from] ValidationError),
    /// The connection failed before any status was received.
    #[error("Network error: {0}")]
    Transport(String),
}

impl ExperimentError {
    /// Short label for log fields and status badges.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BackendOffline => "backend_offline",
            Self::Timeout => "timeout",
            Self::ServerError { .. } => "server_error",
            Self::MalformedResponse(_) => "malformed_response",
            Self::Validation(_) => "validation",
            Self::Transport(_) => "transport",
        }
    }
}

fn server_error_text(status: u16, message: Option<&str>) -> String {
    match message.map(str::trim).filter(|text| !text.is_empty()) {
        Some(text) => text.to_string(),
        None => format!("Server error: {status}"),
    }
}
