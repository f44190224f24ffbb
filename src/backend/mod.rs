//! Remote experiment service: connectivity probing and experiment calls.

mod cancel;
mod http;

pub use cancel::CancellationToken;
pub use http::{EXPERIMENT_PATH, HttpService, PROBE_PATH};

use crate::experiment::{ExperimentError, ExperimentRequest, ExperimentResult};

/// Tri-state availability of the remote service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ConnectivityStatus {
    /// A probe is outstanding (initial state).
    #[default]
    Checking,
    Online,
    Offline,
}

impl ConnectivityStatus {
    /// Banner title shown for this status.
    pub fn label(self) -> &'static str {
        match self {
            Self::Checking => "Checking backend status...",
            Self::Online => "Backend online",
            Self::Offline => "Backend offline",
        }
    }
}

/// Blocking operations against the experiment service.
///
/// Implementations are called from worker threads, never from the UI thread.
pub trait ExperimentService: Send + Sync {
    /// Liveness check; reports `Online` only for a 2xx answer within the probe bound.
    /// Never returns `Checking`.
    fn probe(&self) -> ConnectivityStatus;

    /// Run one experiment, giving up once `cancel` expires.
    fn run_experiment(
        &self,
        request: &ExperimentRequest,
        cancel: &CancellationToken,
    ) -> Result<ExperimentResult, ExperimentError>;
}
