//! Model client boundary: one agent step per call.
//!
//! Concrete backends (HTTP providers, local models, test scripts) implement
//! [`ModelClient`]; the session never sees their wire formats.

use async_trait::async_trait;

use crate::error::SessionError;
use crate::models::LanguageModel;
use crate::types::{ContentPart, ModelMessage, ResponseFormat, ToolCall, ToolChoice};

/// A request for one agent step.
#[derive(Debug, Clone)]
pub struct AgentStepRequest {
    pub messages: Vec<ModelMessage>,
    pub model: LanguageModel,
    pub system_prompt: Option<String>,
    pub tools: Vec<ToolDefinition>,
    pub tool_choice: Option<ToolChoice>,
    pub response_format: Option<ResponseFormat>,
}

/// Tool definition sent to the model.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// One model response: text and/or tool-use blocks, in model order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentStepResponse {
    pub content: Vec<ContentPart>,
}

impl AgentStepResponse {
    /// A plain text response.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentPart::Text { text: text.into() }],
        }
    }

    /// A response that requests the given tool calls.
    pub fn tool_calls(calls: Vec<ToolCall>) -> Self {
        Self {
            content: calls.into_iter().map(ContentPart::ToolUse).collect(),
        }
    }

    /// Concatenated text content.
    pub fn text_content(&self) -> String {
        self.content
            .iter()
            .filter_map(|part| match part {
                ContentPart::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// Tool calls in the order the model emitted them.
    pub fn extract_tool_calls(&self) -> Vec<ToolCall> {
        self.content
            .iter()
            .filter_map(|part| match part {
                ContentPart::ToolUse(call) => Some(call.clone()),
                _ => None,
            })
            .collect()
    }

    /// Convert into the assistant message appended to history.
    ///
    /// Tool results are not valid assistant content and are dropped.
    pub fn into_message(self) -> ModelMessage {
        let content = self
            .content
            .into_iter()
            .filter(|part| !matches!(part, ContentPart::ToolResult(_)))
            .collect();
        ModelMessage::assistant_content(content)
    }
}

/// Core trait implemented by model backends.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Execute one agent step against the running history.
    async fn execute_agent_step(
        &self,
        request: AgentStepRequest,
    ) -> Result<AgentStepResponse, SessionError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Role, ToolResponse};

    #[test]
    fn extract_tool_calls_keeps_model_order() {
        let response = AgentStepResponse {
            content: vec![
                ContentPart::Text {
                    text: "checking".into(),
                },
                ContentPart::ToolUse(ToolCall::new("2", "b", serde_json::json!({}))),
                ContentPart::ToolUse(ToolCall::new("1", "a", serde_json::json!({}))),
            ],
        };
        let ids: Vec<_> = response
            .extract_tool_calls()
            .into_iter()
            .map(|call| call.id)
            .collect();
        assert_eq!(ids, vec!["2", "1"]);
        assert_eq!(response.text_content(), "checking");
    }

    #[test]
    fn into_message_drops_tool_results() {
        let call = ToolCall::new("1", "a", serde_json::json!({}));
        let response = AgentStepResponse {
            content: vec![
                ContentPart::ToolUse(call.clone()),
                ContentPart::ToolResult(ToolResponse::success(&call, "x")),
            ],
        };
        let message = response.into_message();
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.content.len(), 1);
    }
}
