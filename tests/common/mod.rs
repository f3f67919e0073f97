//! Shared test helpers: a scripted model client and stock tools.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use tokio::sync::Notify;

use agent_session::agent_loop::{SessionPhase, SessionStream};
use agent_session::error::SessionError;
use agent_session::models::LanguageModel;
use agent_session::output::StructuredOutput;
use agent_session::provider::{AgentStepRequest, AgentStepResponse, ModelClient};
use agent_session::tools::{AgentTool, AgentToolParameters, ASK_USER_TOOL_NAME};
use agent_session::types::{ModelMessage, Role, ToolCall};

const STREAM_TIMEOUT: Duration = Duration::from_secs(5);

/// Structured answer used across the integration tests.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Answer {
    pub answer: i64,
}

impl StructuredOutput for Answer {
    fn schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": { "answer": { "type": "integer" } },
            "required": ["answer"],
        })
    }

    fn type_name() -> &'static str {
        "answer"
    }
}

/// A model client that replays queued responses and records every request.
#[derive(Default)]
pub struct ScriptedClient {
    responses: Mutex<VecDeque<Result<AgentStepResponse, SessionError>>>,
    fallback: Mutex<Option<AgentStepResponse>>,
    requests: Mutex<Vec<AgentStepRequest>>,
    gates: Mutex<HashMap<usize, Arc<Notify>>>,
    calls: AtomicUsize,
}

impl ScriptedClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn queue(&self, response: AgentStepResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn queue_text(&self, text: &str) {
        self.queue(AgentStepResponse::text(text));
    }

    pub fn queue_tool_calls(&self, calls: Vec<ToolCall>) {
        self.queue(AgentStepResponse::tool_calls(calls));
    }

    pub fn queue_error(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(SessionError::ModelClient {
                message: message.to_string(),
            }));
    }

    /// Response returned once the queue is empty.
    pub fn set_fallback(&self, response: AgentStepResponse) {
        *self.fallback.lock().unwrap() = Some(response);
    }

    /// Hold the call with the given zero-based index until the returned
    /// notify is signalled.
    pub fn gate_call(&self, index: usize) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().unwrap().insert(index, gate.clone());
        gate
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<AgentStepRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for ScriptedClient {
    async fn execute_agent_step(
        &self,
        request: AgentStepRequest,
    ) -> Result<AgentStepResponse, SessionError> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        let gate = self.gates.lock().unwrap().remove(&index);
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(result) => result,
            None => self
                .fallback
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| SessionError::ModelClient {
                    message: "script exhausted".to_string(),
                }),
        }
    }
}

pub fn model() -> LanguageModel {
    "mock:scripted".parse().unwrap()
}

pub fn call(id: &str, name: &str, args: serde_json::Value) -> ToolCall {
    ToolCall::new(id, name, args)
}

pub fn ask_call(id: &str, question: &str) -> ToolCall {
    ToolCall::new(id, ASK_USER_TOOL_NAME, serde_json::json!({ "question": question }))
}

/// `lookup` tool that answers "42" and counts its executions.
pub fn lookup_tool(executions: Arc<AtomicUsize>) -> AgentTool {
    AgentTool::new(
        "lookup",
        "Look up a fact",
        AgentToolParameters::object()
            .string("query", "What to look up", true)
            .build(),
        move |_args, _ctx| {
            let executions = executions.clone();
            async move {
                executions.fetch_add(1, Ordering::SeqCst);
                Ok(serde_json::json!("42"))
            }
        },
    )
}

/// Tool that sleeps before echoing its name.
pub fn slow_tool(name: &'static str, delay_ms: u64) -> AgentTool {
    AgentTool::new(name, "Sleeps, then answers", AgentToolParameters::empty(), move |_args, _ctx| async move {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        Ok(serde_json::json!(name))
    })
}

/// Tool that blocks until `release` is signalled.
pub fn gated_tool(name: &'static str, release: Arc<Notify>) -> AgentTool {
    AgentTool::new(name, "Waits for a signal", AgentToolParameters::empty(), move |_args, _ctx| {
        let release = release.clone();
        async move {
            release.notified().await;
            Ok(serde_json::json!("released"))
        }
    })
}

/// Next phase, failing the test instead of hanging.
pub async fn next_phase<T>(stream: &mut SessionStream<T>) -> Option<SessionPhase<T>> {
    tokio::time::timeout(STREAM_TIMEOUT, stream.next())
        .await
        .expect("timed out waiting for the next session phase")
}

/// Drain the stream to its end.
pub async fn collect<T>(mut stream: SessionStream<T>) -> Vec<SessionPhase<T>> {
    let mut phases = Vec::new();
    while let Some(phase) = next_phase(&mut stream).await {
        phases.push(phase);
    }
    phases
}

/// Read phases until `pred` matches; returns everything read, including the
/// matching phase.
pub async fn read_until<T>(
    stream: &mut SessionStream<T>,
    pred: impl Fn(&SessionPhase<T>) -> bool,
) -> Vec<SessionPhase<T>> {
    let mut phases = Vec::new();
    loop {
        let phase = next_phase(stream)
            .await
            .expect("stream ended before the expected phase");
        let done = pred(&phase);
        phases.push(phase);
        if done {
            return phases;
        }
    }
}

/// Every assistant tool use has a later tool result with the same id.
pub fn assert_tool_results_matched(history: &[ModelMessage]) {
    for (index, message) in history.iter().enumerate() {
        if message.role != Role::Assistant {
            continue;
        }
        for call in message.tool_calls() {
            let answered = history[index + 1..]
                .iter()
                .flat_map(|later| later.tool_results_iter())
                .any(|result| result.call_id == call.id);
            assert!(answered, "tool call {} has no result", call.id);
        }
    }
}
