//! Request shaping options passed to the model client.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Requested response format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    Text,
    JsonObject,
    JsonSchema {
        schema: serde_json::Value,
        name: String,
    },
}

/// Tool-choice policy for one model call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ToolChoice {
    /// The model decides between text and tool calls.
    Auto,
    /// Tools must not be called.
    None,
    /// At least one tool must be called.
    Required,
    /// The named tool must be called.
    Tool(String),
}

impl fmt::Display for ToolChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::None => f.write_str("none"),
            Self::Required => f.write_str("required"),
            Self::Tool(name) => write!(f, "tool:{name}"),
        }
    }
}
