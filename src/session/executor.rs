//! Single-flight experiment execution with supersession and timeouts.

use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::{Duration, Instant};

use super::jobs::{ExperimentRunResult, JobMessage};
use crate::backend::{CancellationToken, ExperimentService};
use crate::experiment::ExperimentRequest;

/// Handle for the one outstanding call. Dropping it cancels the call's token,
/// so every way of leaving the slot releases the call.
#[derive(Debug)]
struct InFlightCall {
    seq: u64,
    token: CancellationToken,
}

impl Drop for InFlightCall {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

pub(crate) struct ExperimentExecutor {
    timeout: Duration,
    next_seq: u64,
    in_flight: Option<InFlightCall>,
}

impl ExperimentExecutor {
    pub(crate) fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            next_seq: 1,
            in_flight: None,
        }
    }

    pub(crate) fn timeout(&self) -> Duration {
        self.timeout
    }

    pub(crate) fn in_flight_seq(&self) -> Option<u64> {
        self.in_flight.as_ref().map(|call| call.seq)
    }

    pub(crate) fn deadline(&self) -> Option<Instant> {
        self.in_flight.as_ref().map(|call| call.token.deadline())
    }

    /// Issue `request` on a worker thread, superseding any outstanding call.
    ///
    /// Superseding cancels the old call's token so its answer is never sent,
    /// but a blocking `ureq` request cannot be aborted: the old worker keeps
    /// its socket until the server answers or the token's deadline passes
    /// (up to the full experiment timeout). Rapid re-runs against a slow
    /// service can therefore leave several idle workers parked at once.
    pub(crate) fn submit(
        &mut self,
        service: Arc<dyn ExperimentService>,
        request: ExperimentRequest,
        tx: Sender<JobMessage>,
    ) -> u64 {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1).max(1);
        if let Some(stale) = self.in_flight.take() {
            tracing::debug!(stale = stale.seq, current = seq, "Superseding experiment call");
        }
        let token = CancellationToken::with_timeout(self.timeout);
        self.in_flight = Some(InFlightCall {
            seq,
            token: token.clone(),
        });
        thread::spawn(move || {
            let result = service.run_experiment(&request, &token);
            if token.is_cancelled() {
                tracing::debug!(seq, "Dropping response of cancelled experiment call");
                return;
            }
            let _ = tx.send(JobMessage::ExperimentFinished(ExperimentRunResult { seq, result }));
        });
        seq
    }

    /// Claim a finished call. Returns false for superseded or cancelled calls.
    pub(crate) fn complete(&mut self, seq: u64) -> bool {
        if self.in_flight_seq() != Some(seq) {
            return false;
        }
        self.in_flight = None;
        true
    }

    /// Cancel the outstanding call if its deadline has passed at `now`.
    pub(crate) fn expire(&mut self, now: Instant) -> Option<u64> {
        let expired = self
            .in_flight
            .as_ref()
            .is_some_and(|call| call.token.is_expired_at(now));
        if !expired {
            return None;
        }
        self.in_flight.take().map(|call| call.seq)
    }

    pub(crate) fn cancel(&mut self) -> Option<u64> {
        self.in_flight.take().map(|call| call.seq)
    }
}
