//! Model identifiers handed to the model client.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SessionError;

const DEFAULT_PROVIDER: &str = "default";

/// A model identifier: provider name plus provider-specific model id.
///
/// Parses from `"provider:model"`; a bare id uses the `default` provider.
///
/// ```
/// use agent_session::models::LanguageModel;
///
/// let model: LanguageModel = "anthropic:claude-sonnet".parse().unwrap();
/// assert_eq!(model.provider_name(), "anthropic");
/// assert_eq!(model.to_string(), "anthropic:claude-sonnet");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct LanguageModel {
    provider: String,
    model_id: String,
}

impl LanguageModel {
    pub fn new(provider: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model_id: model_id.into(),
        }
    }

    /// Get the model's API identifier string.
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Get the provider name.
    pub fn provider_name(&self) -> &str {
        &self.provider
    }
}

impl FromStr for LanguageModel {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (provider, model_id) = match trimmed.split_once(':') {
            Some((provider, model_id)) => (provider.trim(), model_id.trim()),
            None => (DEFAULT_PROVIDER, trimmed),
        };
        if provider.is_empty() || model_id.is_empty() {
            return Err(SessionError::InvalidArgument(format!(
                "invalid model identifier '{s}'; expected 'provider:model'"
            )));
        }
        Ok(Self::new(provider, model_id))
    }
}

impl fmt::Display for LanguageModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider, self.model_id)
    }
}
