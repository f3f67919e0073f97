//! Structured output: typed results decoded from the model's final JSON.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// A type a session can produce as its final answer.
///
/// Implementors describe their JSON shape with [`schema`](Self::schema); the
/// default [`decode`](Self::decode) strips markdown code fences and parses
/// the text with `serde_json`.
///
/// ```
/// use agent_session::output::StructuredOutput;
/// use serde::Deserialize;
///
/// #[derive(Debug, Deserialize)]
/// struct Answer {
///     answer: i64,
/// }
///
/// impl StructuredOutput for Answer {
///     fn schema() -> serde_json::Value {
///         serde_json::json!({
///             "type": "object",
///             "properties": { "answer": { "type": "integer" } },
///             "required": ["answer"],
///         })
///     }
/// }
///
/// let decoded = Answer::decode("```json\n{\"answer\": 4}\n```").unwrap();
/// assert_eq!(decoded.answer, 4);
/// ```
pub trait StructuredOutput: DeserializeOwned + Send + 'static {
    /// JSON Schema describing the expected answer.
    fn schema() -> serde_json::Value;

    /// Name reported alongside the schema in the response format.
    fn type_name() -> &'static str {
        "output"
    }

    /// Decode the model's final text.
    fn decode(text: &str) -> Result<Self, SessionError> {
        let json_text = strip_code_fences(text);
        serde_json::from_str(&json_text).map_err(|e| SessionError::output_decoding(e.to_string()))
    }
}

impl StructuredOutput for serde_json::Value {
    fn schema() -> serde_json::Value {
        serde_json::json!({})
    }

    fn type_name() -> &'static str {
        "json"
    }
}

/// Final value of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SessionOutput<T> {
    /// Decoded structured answer.
    Structured(T),
    /// Raw model text, produced when no tools exist and decoding failed.
    Text(String),
}

impl<T> SessionOutput<T> {
    pub fn structured(self) -> Option<T> {
        match self {
            Self::Structured(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Structured(_) => None,
            Self::Text(text) => Some(text),
        }
    }
}

/// Strip markdown code fences from JSON response.
pub(crate) fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.starts_with("```") {
        let without_opening = if let Some(rest) = trimmed.strip_prefix("```json") {
            rest
        } else if let Some(rest) = trimmed.strip_prefix("```") {
            rest
        } else {
            trimmed
        };
        if let Some(stripped) = without_opening.strip_suffix("```") {
            return stripped.trim().to_string();
        }
        return without_opening.trim().to_string();
    }
    trimmed.to_string()
}
