//! Public session handle.
//!
//! - [`AgentSession::run`] starts a run from a new user message
//! - [`AgentSession::resume`] continues after a pause, a failure or a restart
//! - [`AgentSession::interrupt`] queues a message for the next loop iteration
//! - [`AgentSession::reply`] answers the model's pending question
//! - [`AgentSession::cancel`] pauses the current run
//! - [`AgentSession::clear`] forgets the conversation

use std::sync::Arc;

use tokio::sync::watch;

use super::repair::{repair_history, CONTINUE_PROMPT};
use super::state::SessionShared;
use super::status::SessionStatus;
use crate::agent_loop::{
    empty_stream, failed_stream, spawn_loop, AgentStep, LoopRun, PhaseEmitter, SessionStream,
};
use crate::config::SessionConfig;
use crate::models::LanguageModel;
use crate::output::StructuredOutput;
use crate::provider::ModelClient;
use crate::tools::ToolSet;
use crate::types::ModelMessage;

/// A multi-turn agent conversation driven against one model client and one
/// tool set.
///
/// All methods take `&self`; clones share the same session. Operations that
/// are illegal in the current [`SessionStatus`] are no-ops and return
/// `false`.
///
/// ```no_run
/// # use std::sync::Arc;
/// # use agent_session::prelude::*;
/// # async fn demo(client: Arc<dyn ModelClient>) {
/// use futures::StreamExt;
///
/// let session = AgentSession::new(client, ToolSet::new(), SessionConfig::default());
/// let model: LanguageModel = "openai:gpt-4o".parse().unwrap();
/// let mut stream = session.run::<serde_json::Value>("What's 2+2?", model).await;
/// while let Some(phase) = stream.next().await {
///     println!("{phase:?}");
/// }
/// # }
/// ```
#[derive(Clone)]
pub struct AgentSession {
    shared: Arc<SessionShared>,
}

impl AgentSession {
    pub fn new(client: Arc<dyn ModelClient>, tools: ToolSet, config: SessionConfig) -> Self {
        Self {
            shared: Arc::new(SessionShared::new(client, tools, config)),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.shared.config
    }

    pub fn tools(&self) -> &ToolSet {
        &self.shared.tools
    }

    /// Append `input` as a user turn and start the loop.
    ///
    /// Legal only from `Idle`. On an active session the returned stream
    /// yields a single `Failed` phase; from `Paused` or `Failed` it closes
    /// without yielding anything. The session is left untouched either way.
    pub async fn run<T: StructuredOutput>(
        &self,
        input: impl Into<String>,
        model: LanguageModel,
    ) -> SessionStream<T> {
        let input = input.into();
        let mut state = self.shared.state.lock().await;
        match state.status.check_run() {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!(status = %state.status, "run ignored; resume or clear first");
                return empty_stream();
            }
            Err(err) => {
                tracing::debug!(status = %state.status, "run rejected");
                return failed_stream(err);
            }
        }
        state.history.push(ModelMessage::user(input.clone()));
        state.turns += 1;
        let active = self
            .shared
            .begin_run(&mut state, AgentStep::UserMessage(input.clone()));
        drop(state);

        let (emitter, stream) = PhaseEmitter::channel(active.id);
        emitter.running(AgentStep::UserMessage(input));
        spawn_loop(
            self.shared.clone(),
            LoopRun {
                run: active,
                model,
                emitter,
            },
        );
        stream
    }

    /// Continue the conversation from its current history.
    ///
    /// Orphaned tool calls get placeholder results and a short continuation
    /// prompt is appended before the first model call. Legal from `Paused`,
    /// `Failed`, or `Idle` with a non-empty history.
    pub async fn resume<T: StructuredOutput>(&self, model: LanguageModel) -> SessionStream<T> {
        let mut state = self.shared.state.lock().await;
        if let Err(err) = state.status.check_resume(state.history.len()) {
            tracing::debug!(status = %state.status, "resume rejected");
            return failed_stream(err);
        }
        let repaired = repair_history(&mut state.history);
        if repaired > 0 {
            tracing::debug!(repaired, "repaired orphaned tool calls before resume");
        }
        state.history.push(ModelMessage::user(CONTINUE_PROMPT));
        let active = self.shared.begin_run(&mut state, AgentStep::Thinking);
        drop(state);

        let (emitter, stream) = PhaseEmitter::channel(active.id);
        spawn_loop(
            self.shared.clone(),
            LoopRun {
                run: active,
                model,
                emitter,
            },
        );
        stream
    }

    /// Queue a user message for the start of the next tool-use iteration.
    pub async fn interrupt(&self, text: impl Into<String>) -> bool {
        let mut state = self.shared.state.lock().await;
        if !state.status.can_interrupt() {
            return false;
        }
        state.interrupts.push(text.into());
        tracing::debug!(pending = state.interrupts.len(), "interrupt queued");
        true
    }

    /// Drop interrupts that have not been applied yet; returns how many.
    pub async fn clear_interrupts(&self) -> usize {
        self.shared.state.lock().await.interrupts.clear()
    }

    /// Answer the pending question and let the run continue.
    pub async fn reply(&self, answer: impl Into<String>) -> bool {
        let mut state = self.shared.state.lock().await;
        if !state.status.can_reply() {
            return false;
        }
        let Some(mut pending) = state.pending.take() else {
            return false;
        };
        let answer = answer.into();
        let response = pending.answer_response(&answer);
        pending.resolve(answer);
        self.shared.set_status(
            &mut state,
            SessionStatus::Running(AgentStep::ToolResult(response)),
        );
        true
    }

    /// Pause the current run.
    ///
    /// In-flight model or tool calls finish on their own and their results
    /// are discarded. Queued interrupts are dropped and a pending question
    /// is released with an empty answer.
    pub async fn cancel(&self) -> bool {
        let mut state = self.shared.state.lock().await;
        if !state.status.can_cancel() {
            return false;
        }
        if let Some(run) = state.active_run.take() {
            run.cancel.cancel();
            tracing::debug!(run_id = %run.id, "session run cancel requested");
        }
        state.interrupts.clear();
        if let Some(mut pending) = state.pending.take() {
            pending.resolve(String::new());
        }
        self.shared.set_status(&mut state, SessionStatus::Paused);
        true
    }

    /// Forget the conversation and return to `Idle`.
    pub async fn clear(&self) -> bool {
        let mut state = self.shared.state.lock().await;
        if !state.status.can_clear() {
            return false;
        }
        state.history.clear();
        state.interrupts.clear();
        state.pending = None;
        state.turns = 0;
        self.shared.set_status(&mut state, SessionStatus::Idle);
        true
    }

    /// Snapshot of the conversation history.
    pub async fn messages(&self) -> Vec<ModelMessage> {
        self.shared.state.lock().await.history.clone()
    }

    pub async fn status(&self) -> SessionStatus {
        self.shared.state.lock().await.status.clone()
    }

    /// Whether a run currently owns the session.
    pub async fn is_running(&self) -> bool {
        self.shared.state.lock().await.status.is_active()
    }

    /// Number of operator messages in the conversation: run inputs plus
    /// applied interrupts. Prompts the session adds on its own are not
    /// counted.
    pub async fn turn_count(&self) -> usize {
        self.shared.state.lock().await.turns
    }

    pub async fn waiting_for_answer(&self) -> bool {
        self.shared.state.lock().await.status.can_reply()
    }

    /// The question the run is waiting on, if any.
    pub async fn pending_question(&self) -> Option<String> {
        let state = self.shared.state.lock().await;
        state
            .pending
            .as_ref()
            .map(|pending| pending.question().to_string())
    }

    pub async fn pending_interrupts(&self) -> usize {
        self.shared.state.lock().await.interrupts.len()
    }

    /// Subscribe to status changes.
    pub fn watch_status(&self) -> watch::Receiver<SessionStatus> {
        self.shared.subscribe_status()
    }
}

impl std::fmt::Debug for AgentSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentSession")
            .field("config", &self.shared.config)
            .field("tools", &self.shared.tools)
            .finish()
    }
}
