//! Session event stream types.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::output::SessionOutput;
use crate::types::{ToolCall, ToolResponse};

/// One unit of progress inside a running session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Display)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AgentStep {
    /// A user turn was appended to history.
    UserMessage(String),
    /// A model call is in flight.
    Thinking,
    /// The model requested a tool call.
    ToolCall(ToolCall),
    /// A tool call produced a result (or a user answer was recorded).
    ToolResult(ToolResponse),
    /// A queued interrupt was spliced into history.
    Interrupted(String),
    /// The model asked the user a question.
    AskingUser(String),
}

/// Element of the stream returned by `run`/`resume`.
///
/// Exactly one `Completed` or `Failed` ends a run that is not cancelled; a
/// cancelled run ends with `Paused`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Display)]
#[serde(tag = "phase", content = "data", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SessionPhase<T> {
    Idle,
    Running(AgentStep),
    AwaitingUserInput(String),
    Paused,
    Completed(SessionOutput<T>),
    Failed(String),
}

impl<T> SessionPhase<T> {
    /// Whether this phase ends the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed(_) | Self::Failed(_) | Self::Paused)
    }

    /// The step carried by a `Running` phase.
    pub fn step(&self) -> Option<&AgentStep> {
        match self {
            Self::Running(step) => Some(step),
            _ => None,
        }
    }
}
