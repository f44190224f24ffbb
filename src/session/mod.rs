//! Per-session orchestration: owns the state machine and the background calls.
//!
//! All mutation happens on the thread that owns the [`Session`] (the UI
//! thread). Workers only send tagged results back; [`Session::poll`] drains
//! them, drops anything stale, and feeds the rest to the state machine.

mod executor;
mod jobs;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;
use std::sync::mpsc::TryRecvError;
use std::time::{Duration, Instant};

use crate::backend::{ConnectivityStatus, ExperimentService};
use crate::experiment::{ExperimentError, ExperimentRequest, ValidationError};
use executor::ExperimentExecutor;
use jobs::{JobMessage, SessionJobs};
pub use state::{Command, Machine, SessionEvent, SessionState};

/// Default bound for one experiment call.
pub const EXPERIMENT_TIMEOUT: Duration = Duration::from_secs(120);

pub struct Session {
    machine: Machine,
    service: Arc<dyn ExperimentService>,
    jobs: SessionJobs,
    executor: ExperimentExecutor,
}

impl Session {
    pub fn new(service: Arc<dyn ExperimentService>, experiment_timeout: Duration) -> Self {
        Self {
            machine: Machine::new(),
            service,
            jobs: SessionJobs::new(),
            executor: ExperimentExecutor::new(experiment_timeout),
        }
    }

    pub fn state(&self) -> &SessionState {
        self.machine.state()
    }

    /// Last probe answer; `Checking` while a probe is outstanding.
    pub fn connectivity(&self) -> ConnectivityStatus {
        self.machine.connectivity()
    }

    /// True while a probe or experiment call is outstanding.
    pub fn has_pending_work(&self) -> bool {
        self.jobs.probe_in_progress() || self.executor.in_flight_seq().is_some()
    }

    /// Deadline of the outstanding experiment call, if any.
    pub fn run_deadline(&self) -> Option<Instant> {
        self.executor.deadline()
    }

    /// Leave `Idle` and issue the first connectivity probe.
    pub fn start(&mut self) {
        tracing::info!("Session started");
        self.dispatch(SessionEvent::Started);
    }

    /// Re-probe the service. An outstanding experiment call is abandoned.
    pub fn retry_connectivity(&mut self) {
        if let Some(seq) = self.executor.cancel() {
            tracing::info!(seq, "Abandoning experiment call for connectivity retry");
        }
        self.dispatch(SessionEvent::RetryConnectivity);
    }

    /// Submit a run. Offline and invalid submissions fail immediately without
    /// touching the network; a run issued while another is outstanding
    /// supersedes it.
    pub fn request_run(&mut self, request: Result<ExperimentRequest, ValidationError>) {
        if let Err(err) = &request {
            tracing::warn!(error = %err, "Rejected experiment request");
        }
        self.dispatch(SessionEvent::RunRequested(request));
        if self.state() == &SessionState::Failed(ExperimentError::BackendOffline) {
            tracing::error!("Attempted to run experiment with offline backend");
        }
    }

    /// Apply finished background work and enforce the experiment timeout.
    /// Returns true when the state changed.
    pub fn poll(&mut self) -> bool {
        self.poll_at(Instant::now())
    }

    /// [`Session::poll`] against an explicit clock reading.
    pub fn poll_at(&mut self, now: Instant) -> bool {
        // Every transition poll can trigger leaves Running or Probing.
        let before = self.machine.state().name();

        if let Some(seq) = self.executor.expire(now) {
            tracing::warn!(
                seq,
                timeout_secs = self.executor.timeout().as_secs(),
                "Experiment call timed out"
            );
            self.dispatch(SessionEvent::RunCompleted(Err(ExperimentError::Timeout)));
        }

        loop {
            let message = match self.jobs.try_recv_message() {
                Ok(message) => message,
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            };
            self.handle_message(message);
        }

        self.machine.state().name() != before
    }

    fn handle_message(&mut self, message: JobMessage) {
        match message {
            JobMessage::ProbeFinished(probe) => {
                if !self.jobs.accept_probe(probe.seq) {
                    tracing::debug!(seq = probe.seq, "Discarding stale probe result");
                    return;
                }
                self.dispatch(SessionEvent::ProbeCompleted(probe.status));
            }
            JobMessage::ExperimentFinished(finished) => {
                if !self.executor.complete(finished.seq) {
                    tracing::debug!(seq = finished.seq, "Discarding stale experiment response");
                    return;
                }
                match &finished.result {
                    Ok(result) => tracing::info!(
                        seq = finished.seq,
                        prefix_accuracy = result.prefix.accuracy,
                        performance_retention = result.performance_retention,
                        "Experiment completed successfully"
                    ),
                    Err(err) => tracing::error!(
                        seq = finished.seq,
                        kind = err.kind(),
                        error = %err,
                        "Experiment failed"
                    ),
                }
                self.dispatch(SessionEvent::RunCompleted(finished.result));
            }
        }
    }

    fn dispatch(&mut self, event: SessionEvent) {
        let from = self.machine.state().name();
        let command = self.machine.apply(event);
        let to = self.machine.state().name();
        if from != to {
            tracing::debug!(from, to, "Session transition");
        }
        match command {
            Some(Command::Probe) => {
                let seq = self.jobs.begin_probe(self.service.clone());
                tracing::debug!(seq, "Probing backend");
            }
            Some(Command::Execute(request)) => {
                tracing::info!(
                    dataset = request.dataset().as_str(),
                    model = request.model().as_str(),
                    prefix_length = request.prefix_length(),
                    "Starting experiment"
                );
                let tx = self.jobs.message_sender();
                self.executor.submit(self.service.clone(), request, tx);
            }
            None => {}
        }
    }
}
