use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::thread;

use crate::backend::{ConnectivityStatus, ExperimentService};
use crate::experiment::{ExperimentError, ExperimentResult};

/// Results delivered from worker threads to the session.
#[derive(Debug)]
pub(crate) enum JobMessage {
    ProbeFinished(ProbeResult),
    ExperimentFinished(ExperimentRunResult),
}

#[derive(Debug)]
pub(crate) struct ProbeResult {
    pub(crate) seq: u64,
    pub(crate) status: ConnectivityStatus,
}

#[derive(Debug)]
pub(crate) struct ExperimentRunResult {
    pub(crate) seq: u64,
    pub(crate) result: Result<ExperimentResult, ExperimentError>,
}

/// Message channel shared by all workers, plus probe sequencing.
pub(crate) struct SessionJobs {
    message_tx: Sender<JobMessage>,
    message_rx: Receiver<JobMessage>,
    next_probe_seq: u64,
    pending_probe: Option<u64>,
}

impl SessionJobs {
    pub(crate) fn new() -> Self {
        let (message_tx, message_rx) = std::sync::mpsc::channel::<JobMessage>();
        Self {
            message_tx,
            message_rx,
            next_probe_seq: 1,
            pending_probe: None,
        }
    }

    pub(crate) fn try_recv_message(&self) -> Result<JobMessage, TryRecvError> {
        self.message_rx.try_recv()
    }

    pub(crate) fn message_sender(&self) -> Sender<JobMessage> {
        self.message_tx.clone()
    }

    pub(crate) fn probe_in_progress(&self) -> bool {
        self.pending_probe.is_some()
    }

    /// Start a probe; any earlier probe's answer will be ignored.
    pub(crate) fn begin_probe(&mut self, service: Arc<dyn ExperimentService>) -> u64 {
        let seq = self.next_probe_seq;
        self.next_probe_seq = self.next_probe_seq.wrapping_add(1).max(1);
        self.pending_probe = Some(seq);
        let tx = self.message_tx.clone();
        thread::spawn(move || {
            let status = service.probe();
            let _ = tx.send(JobMessage::ProbeFinished(ProbeResult { seq, status }));
        });
        seq
    }

    /// Returns true when `seq` is the latest probe; clears it as pending.
    pub(crate) fn accept_probe(&mut self, seq: u64) -> bool {
        if self.pending_probe != Some(seq) {
            return false;
        }
        self.pending_probe = None;
        true
    }
}
