//! Tool trait and closure-based tool wrapper.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use super::arguments::ToolArguments;
use super::types::AgentToolParameters;
use crate::error::SessionError;
use crate::types::ToolCall;

/// What a tool knows about the call it is serving.
///
/// The token is a child of the run's token: it fires when the session is
/// cancelled. The session never aborts a tool, so observing it is optional;
/// whatever a tool returns after cancellation is discarded.
#[derive(Debug, Clone, Default)]
pub struct ToolExecutionContext {
    /// Tool call id from the model.
    pub tool_call_id: String,
    /// Tool name as requested by the model.
    pub tool_name: String,
    pub cancel: CancellationToken,
}

impl ToolExecutionContext {
    /// Context for one model-requested call.
    pub fn for_call(call: &ToolCall, cancel: CancellationToken) -> Self {
        Self {
            tool_call_id: call.id.clone(),
            tool_name: call.name.clone(),
            cancel,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves once the owning session is cancelled.
    ///
    /// Long-running tools can race their work against this to stop early.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }
}

/// A capability the model can invoke during a session's tool-use phase.
///
/// Errors never end a run: the loop turns them into error results the model
/// reads on its next step.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the model calls the tool by; unique within a [`ToolSet`](super::ToolSet).
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Input schema advertised to the model. Arguments are not validated
    /// against it.
    fn parameters(&self) -> &AgentToolParameters;

    async fn execute(
        &self,
        args: &ToolArguments,
        ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, SessionError>;
}

type ToolHandler = dyn Fn(
        ToolArguments,
        ToolExecutionContext,
    ) -> BoxFuture<'static, Result<serde_json::Value, SessionError>>
    + Send
    + Sync;

/// Closure-based tool.
///
/// ```
/// use agent_session::tools::{AgentTool, AgentToolParameters};
///
/// let lookup = AgentTool::new(
///     "lookup",
///     "Look up a fact",
///     AgentToolParameters::object().string("query", "What to look up", true).build(),
///     |args, ctx| async move {
///         let query = args.get_str("query")?.to_string();
///         if ctx.is_cancelled() {
///             return Ok(serde_json::json!("skipped"));
///         }
///         Ok(serde_json::json!(format!("result for {query}")))
///     },
/// );
/// # let _ = lookup;
/// ```
#[derive(Clone)]
pub struct AgentTool {
    name: String,
    description: String,
    parameters: AgentToolParameters,
    handler: Arc<ToolHandler>,
}

impl AgentTool {
    pub fn new<F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: AgentToolParameters,
        handler: F,
    ) -> Self
    where
        F: Fn(ToolArguments, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<serde_json::Value, SessionError>> + Send + 'static,
    {
        let handler: Arc<ToolHandler> = Arc::new(
            move |args, ctx| -> BoxFuture<'static, Result<serde_json::Value, SessionError>> {
                Box::pin(handler(args, ctx))
            },
        );
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            handler,
        }
    }
}

#[async_trait]
impl Tool for AgentTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> &AgentToolParameters {
        &self.parameters
    }

    async fn execute(
        &self,
        args: &ToolArguments,
        ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, SessionError> {
        (self.handler)(args.clone(), ctx.clone()).await
    }
}

impl std::fmt::Debug for AgentTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentTool")
            .field("name", &self.name)
            .field("parameters", &self.parameters.schema)
            .finish_non_exhaustive()
    }
}
