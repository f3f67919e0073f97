//! Convenience re-exports for common use.

pub use crate::agent::{AgentSession, SessionStatus};
pub use crate::agent_loop::{AgentStep, SessionPhase, SessionStream};
pub use crate::config::SessionConfig;
pub use crate::error::{Result, SessionError};
pub use crate::models::LanguageModel;
pub use crate::output::{SessionOutput, StructuredOutput};
pub use crate::provider::{AgentStepRequest, AgentStepResponse, ModelClient};
pub use crate::tools::{AgentTool, AgentToolParameters, Tool, ToolArguments, ToolSet};
pub use crate::types::{ContentPart, ModelMessage, Role, ToolCall, ToolResponse};
