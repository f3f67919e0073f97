use futures::stream::{self, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use super::super::events::{AgentStep, SessionPhase};
use super::{LoopRun, RunId, SessionStream};
use crate::agent::state::SessionShared;
use crate::agent::SessionStatus;
use crate::error::SessionError;
use crate::output::SessionOutput;

/// Sending half of one run's phase stream.
pub(crate) struct PhaseEmitter<T> {
    run_id: RunId,
    tx: mpsc::UnboundedSender<SessionPhase<T>>,
}

impl<T: Send + 'static> PhaseEmitter<T> {
    pub(crate) fn channel(run_id: RunId) -> (Self, SessionStream<T>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let stream = UnboundedReceiverStream::new(rx).boxed();
        (Self { run_id, tx }, stream)
    }

    pub(crate) fn emit(&self, phase: SessionPhase<T>) {
        // The caller may drop the stream; the run still finishes.
        if self.tx.send(phase).is_err() {
            tracing::trace!(run_id = %self.run_id, "phase stream closed by consumer");
        }
    }

    pub(crate) fn running(&self, step: AgentStep) {
        self.emit(SessionPhase::Running(step));
    }
}

/// A stream that closes at once, for calls that are ignored.
pub(crate) fn empty_stream<T: Send + 'static>() -> SessionStream<T> {
    stream::empty().boxed()
}

/// A stream that reports `error` and closes without touching the session.
pub(crate) fn failed_stream<T: Send + 'static>(error: SessionError) -> SessionStream<T> {
    stream::iter([SessionPhase::Failed(error.to_string())]).boxed()
}

/// How the loop left.
pub(super) enum LoopExit<T> {
    Completed(SessionOutput<T>),
    Failed(SessionError),
    /// Tool calls were reported but auto-execution is off.
    AwaitingToolExecution,
    /// The run no longer owns the session.
    Canceled,
}

/// Publish the final status and the terminal phase.
pub(super) async fn finish<T: Send + 'static>(
    shared: &SessionShared,
    run: &LoopRun<T>,
    exit: LoopExit<T>,
) {
    let mut state = shared.state.lock().await;
    if !state.owns(run.id()) {
        drop(state);
        tracing::debug!(run_id = %run.id(), "session run canceled");
        run.emitter.emit(SessionPhase::Paused);
        return;
    }
    let phase = match exit {
        LoopExit::Completed(output) => {
            shared.end_run(&mut state, SessionStatus::Idle);
            tracing::debug!(run_id = %run.id(), "session run completed");
            SessionPhase::Completed(output)
        }
        LoopExit::Failed(error) => {
            let reason = error.to_string();
            shared.end_run(&mut state, SessionStatus::Failed(reason.clone()));
            tracing::warn!(run_id = %run.id(), error = %reason, "session run failed");
            SessionPhase::Failed(reason)
        }
        LoopExit::AwaitingToolExecution => {
            shared.end_run(&mut state, SessionStatus::Paused);
            tracing::debug!(run_id = %run.id(), "session paused before tool execution");
            SessionPhase::Paused
        }
        LoopExit::Canceled => {
            // Cancellation always releases the run first.
            shared.end_run(&mut state, SessionStatus::Paused);
            SessionPhase::Paused
        }
    };
    drop(state);
    run.emitter.emit(phase);
}
