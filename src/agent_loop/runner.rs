//! Loop task spawned for every `run`/`resume`.

use std::sync::Arc;

use futures::stream::BoxStream;
use uuid::Uuid;

use super::events::SessionPhase;
use crate::agent::state::{ActiveRun, SessionShared};
use crate::models::LanguageModel;
use crate::output::StructuredOutput;

mod control;
mod engine;
mod tooling;

pub(crate) use control::{empty_stream, failed_stream, PhaseEmitter};

/// Unique run identifier.
pub type RunId = Uuid;

/// Stream of phases for one `run`/`resume`, closed after the final phase.
pub type SessionStream<T> = BoxStream<'static, SessionPhase<T>>;

/// What one loop task needs besides the shared session.
pub(crate) struct LoopRun<T> {
    pub(crate) run: ActiveRun,
    pub(crate) model: LanguageModel,
    pub(crate) emitter: PhaseEmitter<T>,
}

impl<T> LoopRun<T> {
    pub(crate) fn id(&self) -> RunId {
        self.run.id
    }
}

/// Spawn the loop for an already claimed run.
pub(crate) fn spawn_loop<T: StructuredOutput>(shared: Arc<SessionShared>, run: LoopRun<T>) {
    tokio::spawn(async move {
        tracing::debug!(
            run_id = %run.id(),
            model = %run.model,
            max_steps = shared.config.max_steps,
            "session run start"
        );
        let exit = engine::run_loop(&shared, &run).await;
        control::finish(&shared, &run, exit).await;
    });
}
