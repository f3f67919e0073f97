//! Session configuration (layered: code > env > defaults, or a TOML file).

use std::path::Path;

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::error::SessionError;

const DEFAULT_MAX_STEPS: usize = 20;
const MAX_STEPS_ENV: &str = "AGENT_SESSION_MAX_STEPS";
const AUTO_EXECUTE_TOOLS_ENV: &str = "AGENT_SESSION_AUTO_EXECUTE_TOOLS";
const PARALLEL_TOOLS_ENV: &str = "AGENT_SESSION_PARALLEL_TOOLS";
const SYSTEM_PROMPT_ENV: &str = "AGENT_SESSION_SYSTEM_PROMPT";

/// Immutable per-session settings.
///
/// ```
/// use agent_session::config::SessionConfig;
///
/// let config = SessionConfig::builder()
///     .max_steps(8)
///     .system_prompt("You are terse.".to_string())
///     .build();
/// assert!(config.auto_execute_tools);
/// ```
#[derive(Debug, Clone, Builder, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionConfig {
    /// Upper bound on model calls per `run`/`resume`.
    #[builder(default = DEFAULT_MAX_STEPS)]
    pub max_steps: usize,
    /// When false the loop stops right after reporting tool calls.
    #[builder(default = true)]
    pub auto_execute_tools: bool,
    /// Run the non-question calls of one batch concurrently.
    #[builder(default = false)]
    pub parallel_tool_execution: bool,
    /// System prompt passed with every model call.
    pub system_prompt: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            auto_execute_tools: true,
            parallel_tool_execution: false,
            system_prompt: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    session: Option<ConfigSection>,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigSection {
    max_steps: Option<usize>,
    auto_execute_tools: Option<bool>,
    parallel_tool_execution: Option<bool>,
    system_prompt: Option<String>,
}

impl SessionConfig {
    /// Load from environment variables, after reading `.env` if present.
    ///
    /// Unset, unparsable or zero values keep their defaults.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let mut config = Self::default();
        if let Some(max_steps) = std::env::var(MAX_STEPS_ENV)
            .ok()
            .as_deref()
            .and_then(parse_positive_usize)
        {
            config.max_steps = max_steps;
        }
        if let Some(flag) = std::env::var(AUTO_EXECUTE_TOOLS_ENV)
            .ok()
            .as_deref()
            .and_then(parse_flag)
        {
            config.auto_execute_tools = flag;
        }
        if let Some(flag) = std::env::var(PARALLEL_TOOLS_ENV)
            .ok()
            .as_deref()
            .and_then(parse_flag)
        {
            config.parallel_tool_execution = flag;
        }
        if let Ok(prompt) = std::env::var(SYSTEM_PROMPT_ENV) {
            if !prompt.trim().is_empty() {
                config.system_prompt = Some(prompt);
            }
        }
        config
    }

    /// Parse a TOML document with an optional `[session]` table.
    pub fn from_toml_str(raw: &str) -> Result<Self, SessionError> {
        let file: ConfigFile = toml::from_str(raw)
            .map_err(|e| SessionError::Configuration(format!("invalid session config: {e}")))?;
        let section = file.session.unwrap_or_default();
        let mut config = Self::default();
        if let Some(max_steps) = section.max_steps {
            if max_steps == 0 {
                return Err(SessionError::Configuration(
                    "max_steps must be greater than zero".into(),
                ));
            }
            config.max_steps = max_steps;
        }
        if let Some(flag) = section.auto_execute_tools {
            config.auto_execute_tools = flag;
        }
        if let Some(flag) = section.parallel_tool_execution {
            config.parallel_tool_execution = flag;
        }
        config.system_prompt = section.system_prompt;
        Ok(config)
    }

    /// Read and parse a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            SessionError::Configuration(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }
}

fn parse_positive_usize(value: &str) -> Option<usize> {
    let parsed = value.trim().parse::<usize>().ok()?;
    if parsed == 0 {
        None
    } else {
        Some(parsed)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
