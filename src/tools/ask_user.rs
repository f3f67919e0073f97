//! The reserved question tool.
//!
//! The model calls it to ask the operator something; the session answers it
//! through [`AgentSession::reply`](crate::agent::AgentSession::reply) instead
//! of executing it.

use async_trait::async_trait;

use super::arguments::ToolArguments;
use super::tool::{Tool, ToolExecutionContext};
use super::types::AgentToolParameters;
use crate::error::SessionError;
use crate::types::ToolCall;

/// Well-known name of the question tool.
pub const ASK_USER_TOOL_NAME: &str = "ask_user";

const ASK_USER_DESCRIPTION: &str = "Ask the user a clarifying question and wait for their answer. \
Use this only when you cannot proceed without information the user must provide.";

/// Tool definition that advertises the question capability to the model.
#[derive(Debug, Clone)]
pub struct AskUserTool {
    parameters: AgentToolParameters,
}

impl AskUserTool {
    pub fn new() -> Self {
        Self {
            parameters: AgentToolParameters::object()
                .string("question", "The question to ask the user", true)
                .build(),
        }
    }
}

impl Default for AskUserTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for AskUserTool {
    fn name(&self) -> &str {
        ASK_USER_TOOL_NAME
    }

    fn description(&self) -> &str {
        ASK_USER_DESCRIPTION
    }

    fn parameters(&self) -> &AgentToolParameters {
        &self.parameters
    }

    async fn execute(
        &self,
        _args: &ToolArguments,
        _ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, SessionError> {
        Err(SessionError::InvalidState(format!(
            "{ASK_USER_TOOL_NAME} is answered by the user, not executed"
        )))
    }
}

/// Whether `call` targets the question tool.
pub fn is_ask_user_call(call: &ToolCall) -> bool {
    call.name == ASK_USER_TOOL_NAME
}

/// Extract the question text from a question-tool call.
pub fn question_from_call(call: &ToolCall) -> Result<String, SessionError> {
    let args = ToolArguments::new(call.arguments.clone());
    let question = args.get_str("question")?.trim();
    if question.is_empty() {
        return Err(SessionError::InvalidArgument(
            "question must not be empty".into(),
        ));
    }
    Ok(question.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_is_trimmed() {
        let call = ToolCall::new("q", ASK_USER_TOOL_NAME, serde_json::json!({ "question": " Which city? " }));
        assert!(is_ask_user_call(&call));
        assert_eq!(question_from_call(&call).unwrap(), "Which city?");
    }

    #[test]
    fn blank_or_missing_question_is_rejected() {
        let blank = ToolCall::new("q", ASK_USER_TOOL_NAME, serde_json::json!({ "question": "  " }));
        assert!(question_from_call(&blank).is_err());
        let missing = ToolCall::new("q", ASK_USER_TOOL_NAME, serde_json::json!({}));
        assert!(question_from_call(&missing).is_err());
    }

    #[tokio::test]
    async fn direct_execution_is_refused() {
        let tool = AskUserTool::new();
        let result = tool
            .execute(
                &ToolArguments::new(serde_json::json!({ "question": "?" })),
                &ToolExecutionContext::default(),
            )
            .await;
        assert!(matches!(result, Err(SessionError::InvalidState(_))));
    }
}
