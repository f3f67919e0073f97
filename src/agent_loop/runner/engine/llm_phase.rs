use super::super::control::LoopExit;
use super::super::LoopRun;
use crate::agent::state::SessionShared;
use crate::agent::SessionStatus;
use crate::agent_loop::phase::LoopPhase;
use crate::agent_loop::AgentStep;
use crate::error::SessionError;
use crate::output::StructuredOutput;
use crate::provider::{AgentStepRequest, AgentStepResponse};
use crate::types::{ContentPart, ModelMessage, ResponseFormat, ToolCall, ToolChoice};

/// Text and tool calls of a response that was appended to history.
pub(super) struct RecordedResponse {
    pub(super) text: String,
    pub(super) tool_calls: Vec<ToolCall>,
}

/// Splice queued interrupts into history as user messages.
pub(super) async fn drain_interrupts<T: Send + 'static>(
    shared: &SessionShared,
    run: &LoopRun<T>,
) -> Result<(), LoopExit<T>> {
    let drained = {
        let mut state = shared.state.lock().await;
        if !state.owns(run.id()) {
            return Err(LoopExit::Canceled);
        }
        let drained = state.interrupts.drain();
        for text in &drained {
            state.history.push(ModelMessage::user(text.clone()));
        }
        state.turns += drained.len();
        if let Some(last) = drained.last() {
            let status = SessionStatus::Running(AgentStep::Interrupted(last.clone()));
            shared.set_status(&mut state, status);
        }
        drained
    };
    if !drained.is_empty() {
        tracing::debug!(run_id = %run.id(), count = drained.len(), "session interrupts applied");
    }
    for text in drained {
        run.emitter.running(AgentStep::Interrupted(text));
    }
    Ok(())
}

/// Call the model once with a snapshot of history.
pub(super) async fn call_model<T: StructuredOutput>(
    shared: &SessionShared,
    run: &LoopRun<T>,
    phase: LoopPhase,
) -> Result<AgentStepResponse, LoopExit<T>> {
    let request = {
        let mut state = shared.state.lock().await;
        if !state.owns(run.id()) {
            return Err(LoopExit::Canceled);
        }
        shared.set_status(&mut state, SessionStatus::Running(AgentStep::Thinking));
        build_request::<T>(shared, run, &state.history, phase)
    };
    run.emitter.running(AgentStep::Thinking);

    // Runs to completion even if the session is cancelled meanwhile; the
    // caller discards the response once it sees the run was released.
    shared
        .client
        .execute_agent_step(request)
        .await
        .map_err(|err| LoopExit::Failed(SessionError::model_client(err)))
}

fn build_request<T: StructuredOutput>(
    shared: &SessionShared,
    run: &LoopRun<T>,
    history: &[ModelMessage],
    phase: LoopPhase,
) -> AgentStepRequest {
    let (tools, tool_choice, response_format) = match phase {
        LoopPhase::ToolUse => {
            let tools = shared.tools.definitions();
            let choice = (!tools.is_empty()).then_some(ToolChoice::Auto);
            (tools, choice, None)
        }
        LoopPhase::FinalOutput { .. } => (
            Vec::new(),
            Some(ToolChoice::None),
            Some(ResponseFormat::JsonSchema {
                schema: T::schema(),
                name: T::type_name().to_string(),
            }),
        ),
    };
    AgentStepRequest {
        messages: history.to_vec(),
        model: run.model.clone(),
        system_prompt: shared.config.system_prompt.clone(),
        tools,
        tool_choice,
        response_format,
    }
}

/// Append the model's response to history.
///
/// In the final-output phase no tools were offered, so stray tool-use blocks
/// are dropped to keep every recorded tool use answerable.
pub(super) async fn record_response<T: Send + 'static>(
    shared: &SessionShared,
    run: &LoopRun<T>,
    response: AgentStepResponse,
    phase: LoopPhase,
) -> Result<RecordedResponse, LoopExit<T>> {
    let text = response.text_content();
    let tool_calls = if phase.is_tool_use() {
        response.extract_tool_calls()
    } else {
        Vec::new()
    };
    let mut message = response.into_message();
    if !phase.is_tool_use() {
        message
            .content
            .retain(|part| !matches!(part, ContentPart::ToolUse(_)));
    }

    let mut state = shared.state.lock().await;
    if !state.owns(run.id()) {
        return Err(LoopExit::Canceled);
    }
    if !message.content.is_empty() {
        state.history.push(message);
    }
    Ok(RecordedResponse { text, tool_calls })
}

/// Append a synthetic user prompt (structured-answer request or retry).
pub(super) async fn append_prompt<T: Send + 'static>(
    shared: &SessionShared,
    run: &LoopRun<T>,
    prompt: String,
) -> Result<(), LoopExit<T>> {
    let mut state = shared.state.lock().await;
    if !state.owns(run.id()) {
        return Err(LoopExit::Canceled);
    }
    state.history.push(ModelMessage::user(prompt));
    Ok(())
}
