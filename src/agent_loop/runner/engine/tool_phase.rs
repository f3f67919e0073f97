use super::super::control::LoopExit;
use super::super::tooling::{execute_planned_calls, execute_tool_call, plan_call, PlannedCall};
use super::super::LoopRun;
use super::report_step;
use crate::agent::rendezvous::PendingQuestion;
use crate::agent::state::SessionShared;
use crate::agent::SessionStatus;
use crate::agent_loop::{AgentStep, SessionPhase};
use crate::types::{ModelMessage, ToolCall, ToolResponse};

/// The question call that suspends the run after the batch.
struct AskedQuestion {
    call: ToolCall,
    question: String,
}

/// Execute one batch of tool calls, merge the results into history and, if
/// the model asked a question, wait for the answer.
pub(super) async fn run_tool_phase<T: Send + 'static>(
    shared: &SessionShared,
    run: &LoopRun<T>,
    calls: &[ToolCall],
) -> Result<(), LoopExit<T>> {
    tracing::debug!(
        run_id = %run.id(),
        count = calls.len(),
        parallel = shared.config.parallel_tool_execution,
        "session tool batch"
    );
    let (results, asked) = if shared.config.parallel_tool_execution {
        run_parallel(shared, run, calls).await?
    } else {
        run_sequential(shared, run, calls).await?
    };
    merge_results(shared, run, results).await?;
    if let Some(asked) = asked {
        await_answer(shared, run, asked).await?;
    }
    Ok(())
}

async fn run_sequential<T: Send + 'static>(
    shared: &SessionShared,
    run: &LoopRun<T>,
    calls: &[ToolCall],
) -> Result<(Vec<ToolResponse>, Option<AskedQuestion>), LoopExit<T>> {
    let mut results = Vec::with_capacity(calls.len());
    let mut asked = None;
    let mut question_taken = false;
    for call in calls {
        report_step(shared, run, AgentStep::ToolCall(call.clone())).await?;
        let response = match plan_call(call, &mut question_taken) {
            PlannedCall::Question(question) => {
                report_step(shared, run, AgentStep::AskingUser(question.clone())).await?;
                asked = Some(AskedQuestion {
                    call: call.clone(),
                    question,
                });
                continue;
            }
            PlannedCall::Resolved(response) => response,
            PlannedCall::Execute => {
                execute_tool_call(&shared.tools, call, run.run.cancel.child_token()).await
            }
        };
        report_step(shared, run, AgentStep::ToolResult(response.clone())).await?;
        results.push(response);
    }
    Ok((results, asked))
}

async fn run_parallel<T: Send + 'static>(
    shared: &SessionShared,
    run: &LoopRun<T>,
    calls: &[ToolCall],
) -> Result<(Vec<ToolResponse>, Option<AskedQuestion>), LoopExit<T>> {
    let mut batch = Vec::with_capacity(calls.len());
    let mut asked = None;
    let mut question_taken = false;
    for call in calls {
        report_step(shared, run, AgentStep::ToolCall(call.clone())).await?;
        let plan = plan_call(call, &mut question_taken);
        if let PlannedCall::Question(question) = &plan {
            report_step(shared, run, AgentStep::AskingUser(question.clone())).await?;
            asked = Some(AskedQuestion {
                call: call.clone(),
                question: question.clone(),
            });
        }
        batch.push((call.clone(), plan));
    }

    let results = execute_planned_calls(&shared.tools, batch, &run.run.cancel).await;
    for response in &results {
        report_step(shared, run, AgentStep::ToolResult(response.clone())).await?;
    }
    Ok((results, asked))
}

/// Append the batch's results as one user message, in call order.
async fn merge_results<T: Send + 'static>(
    shared: &SessionShared,
    run: &LoopRun<T>,
    results: Vec<ToolResponse>,
) -> Result<(), LoopExit<T>> {
    if results.is_empty() {
        return Ok(());
    }
    let mut state = shared.state.lock().await;
    if !state.owns(run.id()) {
        return Err(LoopExit::Canceled);
    }
    state.history.push(ModelMessage::tool_results(results));
    Ok(())
}

/// Suspend until `reply` or `cancel` resolves the question, then record the
/// answer as the question call's result.
async fn await_answer<T: Send + 'static>(
    shared: &SessionShared,
    run: &LoopRun<T>,
    asked: AskedQuestion,
) -> Result<(), LoopExit<T>> {
    let AskedQuestion { call, question } = asked;
    let answer_rx = {
        let mut state = shared.state.lock().await;
        if !state.owns(run.id()) {
            return Err(LoopExit::Canceled);
        }
        let (pending, answer_rx) = PendingQuestion::new(call.clone(), question.clone());
        state.pending = Some(pending);
        shared.set_status(&mut state, SessionStatus::AwaitingUserInput(question.clone()));
        answer_rx
    };
    tracing::debug!(run_id = %run.id(), "session awaiting user input");
    run.emitter.emit(SessionPhase::AwaitingUserInput(question));

    // A dropped responder only happens on teardown; treat it like cancel.
    let answer = answer_rx.await.unwrap_or_default();

    let response = {
        let mut state = shared.state.lock().await;
        if !state.owns(run.id()) {
            return Err(LoopExit::Canceled);
        }
        let response = ToolResponse::success(&call, answer);
        state.history.push(ModelMessage::tool_results(vec![response.clone()]));
        shared.set_status(
            &mut state,
            SessionStatus::Running(AgentStep::ToolResult(response.clone())),
        );
        response
    };
    run.emitter.running(AgentStep::ToolResult(response));
    Ok(())
}
