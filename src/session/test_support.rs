use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use super::Session;
use crate::backend::{CancellationToken, ConnectivityStatus, ExperimentService};
use crate::experiment::{ExperimentError, ExperimentRequest, ExperimentResult};

/// Scripted behavior for one experiment call.
pub(crate) enum ScriptedRun {
    Respond(Result<ExperimentResult, ExperimentError>),
    /// Block until the sender fires (or is dropped), then answer.
    Gated(Receiver<()>, Result<ExperimentResult, ExperimentError>),
    /// Block until the caller cancels or the token expires.
    Hang,
}

/// In-process service whose answers are keyed by request prefix length.
pub(crate) struct ScriptedService {
    probe_status: Mutex<ConnectivityStatus>,
    runs: Mutex<HashMap<u32, ScriptedRun>>,
    probe_calls: AtomicUsize,
    run_calls: AtomicUsize,
    finished_calls: AtomicUsize,
}

impl ScriptedService {
    pub(crate) fn new(probe_status: ConnectivityStatus) -> Arc<Self> {
        Arc::new(Self {
            probe_status: Mutex::new(probe_status),
            runs: Mutex::new(HashMap::new()),
            probe_calls: AtomicUsize::new(0),
            run_calls: AtomicUsize::new(0),
            finished_calls: AtomicUsize::new(0),
        })
    }

    pub(crate) fn script(&self, prefix_length: u32, run: ScriptedRun) {
        self.runs
            .lock()
            .expect("scripted runs mutex poisoned")
            .insert(prefix_length, run);
    }

    pub(crate) fn set_probe(&self, status: ConnectivityStatus) {
        *self.probe_status.lock().expect("probe mutex poisoned") = status;
    }

    pub(crate) fn probes_made(&self) -> usize {
        self.probe_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn runs_started(&self) -> usize {
        self.run_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn runs_finished(&self) -> usize {
        self.finished_calls.load(Ordering::SeqCst)
    }
}

impl ExperimentService for ScriptedService {
    fn probe(&self) -> ConnectivityStatus {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        *self.probe_status.lock().expect("probe mutex poisoned")
    }

    fn run_experiment(
        &self,
        request: &ExperimentRequest,
        cancel: &CancellationToken,
    ) -> Result<ExperimentResult, ExperimentError> {
        self.run_calls.fetch_add(1, Ordering::SeqCst);
        let script = self
            .runs
            .lock()
            .expect("scripted runs mutex poisoned")
            .remove(&request.prefix_length());
        let outcome = match script {
            Some(ScriptedRun::Respond(outcome)) => outcome,
            Some(ScriptedRun::Gated(gate, outcome)) => {
                let _ = gate.recv_timeout(Duration::from_secs(10));
                outcome
            }
            Some(ScriptedRun::Hang) => {
                while !cancel.is_cancelled() && !cancel.is_expired_at(Instant::now()) {
                    std::thread::sleep(Duration::from_millis(2));
                }
                Err(ExperimentError::Timeout)
            }
            None => Err(ExperimentError::Transport(format!(
                "no scripted run for prefix length {}",
                request.prefix_length()
            ))),
        };
        self.finished_calls.fetch_add(1, Ordering::SeqCst);
        outcome
    }
}

/// Poll until `predicate` holds, failing the test after a few seconds.
pub(crate) fn poll_until(session: &mut Session, predicate: impl Fn(&Session) -> bool) {
    for _ in 0..1000 {
        session.poll();
        if predicate(session) {
            return;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    panic!("session never reached expected state: {:?}", session.state());
}

pub(crate) fn wait_for(condition: impl Fn() -> bool) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    panic!("condition not reached in time");
}
