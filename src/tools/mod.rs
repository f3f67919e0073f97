//! Tool system for function calling.

pub mod arguments;
pub mod ask_user;
pub mod set;
pub mod tool;
pub mod types;

pub use arguments::ToolArguments;
pub use ask_user::{AskUserTool, ASK_USER_TOOL_NAME};
pub use set::ToolSet;
pub use tool::{AgentTool, Tool, ToolExecutionContext};
pub use types::AgentToolParameters;
