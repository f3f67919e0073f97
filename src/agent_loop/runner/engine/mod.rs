use super::control::LoopExit;
use super::LoopRun;
use crate::agent::state::SessionShared;
use crate::agent::SessionStatus;
use crate::agent_loop::phase::{decode_retry_request, LoopPhase, FINAL_OUTPUT_REQUEST};
use crate::agent_loop::AgentStep;
use crate::error::SessionError;
use crate::output::{SessionOutput, StructuredOutput};

mod llm_phase;
mod tool_phase;

use llm_phase::{append_prompt, call_model, drain_interrupts, record_response, RecordedResponse};
use tool_phase::run_tool_phase;

/// Per-run loop position. Both fields start fresh on every `run`/`resume`.
struct LoopCursor {
    phase: LoopPhase,
    steps: usize,
}

/// Drive the loop until it ends; the exit decides the final status.
pub(super) async fn run_loop<T: StructuredOutput>(
    shared: &SessionShared,
    run: &LoopRun<T>,
) -> LoopExit<T> {
    let mut cursor = LoopCursor {
        phase: LoopPhase::ToolUse,
        steps: 0,
    };
    loop {
        // `Err` carries the reason the loop stops, including success.
        if let Err(exit) = run_iteration(shared, run, &mut cursor).await {
            return exit;
        }
    }
}

async fn run_iteration<T: StructuredOutput>(
    shared: &SessionShared,
    run: &LoopRun<T>,
    cursor: &mut LoopCursor,
) -> Result<(), LoopExit<T>> {
    let max_steps = shared.config.max_steps;
    if cursor.steps >= max_steps {
        return Err(LoopExit::Failed(SessionError::MaxStepsExceeded { steps: max_steps }));
    }
    if cursor.phase.is_tool_use() {
        drain_interrupts(shared, run).await?;
    }

    cursor.steps += 1;
    tracing::debug!(
        run_id = %run.id(),
        step = cursor.steps,
        phase = %cursor.phase,
        "session model call"
    );
    let response = call_model(shared, run, cursor.phase).await?;
    let recorded = record_response(shared, run, response, cursor.phase).await?;

    match cursor.phase {
        LoopPhase::ToolUse => handle_tool_use(shared, run, cursor, recorded).await,
        LoopPhase::FinalOutput { retry_count } => match T::decode(&recorded.text) {
            Ok(value) => Err(LoopExit::Completed(SessionOutput::Structured(value))),
            Err(err) => {
                let Some(next) = cursor.phase.next_retry() else {
                    return Err(LoopExit::Failed(err));
                };
                tracing::debug!(
                    run_id = %run.id(),
                    retry_count,
                    error = %err,
                    "session final output did not decode; retrying"
                );
                cursor.phase = next;
                append_prompt(shared, run, decode_retry_request(&err.to_string())).await
            }
        },
    }
}

async fn handle_tool_use<T: StructuredOutput>(
    shared: &SessionShared,
    run: &LoopRun<T>,
    cursor: &mut LoopCursor,
    recorded: RecordedResponse,
) -> Result<(), LoopExit<T>> {
    if recorded.tool_calls.is_empty() {
        if !shared.tools.is_empty() {
            tracing::debug!(run_id = %run.id(), "session requesting final output");
            cursor.phase = LoopPhase::FinalOutput { retry_count: 0 };
            return append_prompt(shared, run, FINAL_OUTPUT_REQUEST.to_string()).await;
        }
        // No tools means no retry path: fall back to the raw text.
        let output = match T::decode(&recorded.text) {
            Ok(value) => SessionOutput::Structured(value),
            Err(err) => {
                tracing::debug!(run_id = %run.id(), error = %err, "session returning raw text");
                SessionOutput::Text(recorded.text)
            }
        };
        return Err(LoopExit::Completed(output));
    }

    if !shared.config.auto_execute_tools {
        for call in recorded.tool_calls {
            report_step(shared, run, AgentStep::ToolCall(call)).await?;
        }
        return Err(LoopExit::AwaitingToolExecution);
    }

    // Tool results are only useful if another model call can read them.
    if cursor.steps >= shared.config.max_steps {
        return Err(LoopExit::Failed(SessionError::MaxStepsExceeded {
            steps: shared.config.max_steps,
        }));
    }
    run_tool_phase(shared, run, &recorded.tool_calls).await
}

/// Mirror `step` into the status and emit it, if the run still owns the
/// session.
async fn report_step<T: Send + 'static>(
    shared: &SessionShared,
    run: &LoopRun<T>,
    step: AgentStep,
) -> Result<(), LoopExit<T>> {
    {
        let mut state = shared.state.lock().await;
        if !state.owns(run.id()) {
            return Err(LoopExit::Canceled);
        }
        shared.set_status(&mut state, SessionStatus::Running(step.clone()));
    }
    run.emitter.running(step);
    Ok(())
}
