//! Orchestration state machine.
//!
//! [`Machine::apply`] is the only way the state changes. It is pure: side
//! effects are returned as a [`Command`] for the owning session to carry out.

use crate::backend::ConnectivityStatus;
use crate::experiment::{ExperimentError, ExperimentRequest, ExperimentResult, ValidationError};

/// States a consumer renders against.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionState {
    Idle,
    Probing,
    /// Probe finished; holds `Online` or `Offline`.
    Ready(ConnectivityStatus),
    Running,
    Succeeded(Box<ExperimentResult>),
    Failed(ExperimentError),
}

impl SessionState {
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Probing | Self::Running)
    }

    pub fn result(&self) -> Option<&ExperimentResult> {
        match self {
            Self::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ExperimentError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Probing => "probing",
            Self::Ready(_) => "ready",
            Self::Running => "running",
            Self::Succeeded(_) => "succeeded",
            Self::Failed(_) => "failed",
        }
    }
}

/// Inputs to the state machine.
#[derive(Clone, Debug)]
pub enum SessionEvent {
    Started,
    RetryConnectivity,
    ProbeCompleted(ConnectivityStatus),
    RunRequested(Result<ExperimentRequest, ValidationError>),
    RunCompleted(Result<ExperimentResult, ExperimentError>),
}

/// Side effect requested by a transition.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Probe,
    Execute(ExperimentRequest),
}

/// Current state plus the last probe answer, which gates run requests.
#[derive(Clone, Debug)]
pub struct Machine {
    state: SessionState,
    connectivity: ConnectivityStatus,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            connectivity: ConnectivityStatus::Checking,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn connectivity(&self) -> ConnectivityStatus {
        self.connectivity
    }

    /// Apply one event and return the side effect the caller must perform.
    pub fn apply(&mut self, event: SessionEvent) -> Option<Command> {
        match event {
            SessionEvent::Started => {
                if self.state != SessionState::Idle {
                    return None;
                }
                self.begin_probe()
            }
            SessionEvent::RetryConnectivity => self.begin_probe(),
            SessionEvent::ProbeCompleted(status) => {
                if self.state != SessionState::Probing {
                    return None;
                }
                let status = match status {
                    ConnectivityStatus::Online => ConnectivityStatus::Online,
                    ConnectivityStatus::Offline | ConnectivityStatus::Checking => {
                        ConnectivityStatus::Offline
                    }
                };
                self.connectivity = status;
                self.state = SessionState::Ready(status);
                None
            }
            SessionEvent::RunRequested(request) => self.request_run(request),
            SessionEvent::RunCompleted(outcome) => {
                if self.state != SessionState::Running {
                    return None;
                }
                self.state = match outcome {
                    Ok(result) => SessionState::Succeeded(Box::new(result)),
                    Err(err) => SessionState::Failed(err),
                };
                None
            }
        }
    }

    fn begin_probe(&mut self) -> Option<Command> {
        self.state = SessionState::Probing;
        self.connectivity = ConnectivityStatus::Checking;
        Some(Command::Probe)
    }

    fn request_run(
        &mut self,
        request: Result<ExperimentRequest, ValidationError>,
    ) -> Option<Command> {
        if matches!(self.state, SessionState::Idle | SessionState::Probing) {
            return None;
        }
        if self.connectivity != ConnectivityStatus::Online {
            self.state = SessionState::Failed(ExperimentError::BackendOffline);
            return None;
        }
        match request {
            Ok(request) => {
                self.state = SessionState::Running;
                Some(Command::Execute(request))
            }
            Err(err) => {
                self.state = SessionState::Failed(err.into());
                None
            }
        }
    }
}
