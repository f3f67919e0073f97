//! Name-keyed tool collection handed to a session.

use std::sync::Arc;

use super::arguments::ToolArguments;
use super::ask_user::AskUserTool;
use super::tool::{Tool, ToolExecutionContext};
use crate::error::SessionError;
use crate::provider::ToolDefinition;

/// Ordered set of tools, unique by name. May be empty.
#[derive(Clone, Default)]
pub struct ToolSet {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool, replacing any tool with the same name.
    pub fn with_tool(mut self, tool: impl Tool + 'static) -> Self {
        self.insert(Arc::new(tool));
        self
    }

    /// Add a shared tool, replacing any tool with the same name.
    pub fn with_shared_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.insert(tool);
        self
    }

    /// Offer the question tool to the model.
    pub fn with_ask_user(self) -> Self {
        self.with_tool(AskUserTool::new())
    }

    /// Insert a tool; returns the tool it replaced, if any.
    pub fn insert(&mut self, tool: Arc<dyn Tool>) -> Option<Arc<dyn Tool>> {
        match self.tools.iter_mut().find(|t| t.name() == tool.name()) {
            Some(slot) => Some(std::mem::replace(slot, tool)),
            None => {
                self.tools.push(tool);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Definitions advertised to the model, in insertion order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.parameters().schema.clone(),
            })
            .collect()
    }

    /// Execute the named tool and render its output as text.
    ///
    /// JSON strings are returned verbatim; any other value is serialized.
    pub async fn execute(
        &self,
        name: &str,
        arguments: &serde_json::Value,
        ctx: &ToolExecutionContext,
    ) -> Result<String, SessionError> {
        let tool = self
            .get(name)
            .ok_or_else(|| SessionError::ToolNotFound(name.to_string()))?;
        let args = ToolArguments::new(arguments.clone());
        let value = tool.execute(&args, ctx).await?;
        Ok(render_output(value))
    }
}

impl std::fmt::Debug for ToolSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolSet")
            .field("tools", &self.names())
            .finish()
    }
}

fn render_output(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text,
        other => other.to_string(),
    }
}
