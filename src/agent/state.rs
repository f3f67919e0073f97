//! Engine state shared between the public handle and the loop task.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::interrupts::InterruptQueue;
use super::rendezvous::PendingQuestion;
use super::status::SessionStatus;
use crate::agent_loop::{AgentStep, RunId};
use crate::config::SessionConfig;
use crate::provider::ModelClient;
use crate::tools::ToolSet;
use crate::types::ModelMessage;

/// The run that currently owns the session.
#[derive(Debug, Clone)]
pub(crate) struct ActiveRun {
    pub(crate) id: RunId,
    pub(crate) cancel: CancellationToken,
}

/// Everything mutable about a session, behind one lock.
#[derive(Debug, Default)]
pub(crate) struct SessionState {
    pub(crate) history: Vec<ModelMessage>,
    pub(crate) interrupts: InterruptQueue,
    pub(crate) status: SessionStatus,
    pub(crate) pending: Option<PendingQuestion>,
    pub(crate) active_run: Option<ActiveRun>,
    /// Operator messages taken into history: run inputs and applied
    /// interrupts.
    pub(crate) turns: usize,
}

impl SessionState {
    /// Whether `run_id` is still the active run.
    pub(crate) fn owns(&self, run_id: RunId) -> bool {
        self.active_run.as_ref().is_some_and(|run| run.id == run_id)
    }
}

pub(crate) struct SessionShared {
    pub(crate) state: Mutex<SessionState>,
    pub(crate) client: Arc<dyn ModelClient>,
    pub(crate) tools: ToolSet,
    pub(crate) config: SessionConfig,
    status_tx: watch::Sender<SessionStatus>,
}

impl SessionShared {
    pub(crate) fn new(client: Arc<dyn ModelClient>, tools: ToolSet, config: SessionConfig) -> Self {
        let (status_tx, _status_rx) = watch::channel(SessionStatus::Idle);
        Self {
            state: Mutex::new(SessionState::default()),
            client,
            tools,
            config,
            status_tx,
        }
    }

    pub(crate) fn subscribe_status(&self) -> watch::Receiver<SessionStatus> {
        self.status_tx.subscribe()
    }

    /// Update the status and publish it to watchers. Caller holds the lock.
    pub(crate) fn set_status(&self, state: &mut SessionState, status: SessionStatus) {
        tracing::trace!(status = %status, "session status");
        state.status = status.clone();
        self.status_tx.send_replace(status);
    }

    /// Claim the session for a new run.
    pub(crate) fn begin_run(&self, state: &mut SessionState, first_step: AgentStep) -> ActiveRun {
        let run = ActiveRun {
            id: Uuid::new_v4(),
            cancel: CancellationToken::new(),
        };
        state.active_run = Some(run.clone());
        self.set_status(state, SessionStatus::Running(first_step));
        run
    }

    /// Release the session after a run ends on its own.
    ///
    /// Interrupts still queued belong to the finished run and are dropped.
    pub(crate) fn end_run(&self, state: &mut SessionState, status: SessionStatus) {
        state.active_run = None;
        state.pending = None;
        let dropped = state.interrupts.clear();
        if dropped > 0 {
            tracing::debug!(dropped, "dropped interrupts left over from finished run");
        }
        self.set_status(state, status);
    }
}
