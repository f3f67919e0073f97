//! History repair for resuming a session that was cut off mid tool batch.

use std::collections::HashSet;

use crate::types::{ModelMessage, Role, ToolCall, ToolResponse};

/// Output recorded for a tool call whose result never made it into history.
pub const INTERRUPTED_TOOL_OUTPUT: &str =
    "Session was interrupted. Continuing from where we left off.";

/// Appended as a user turn when a session resumes.
pub const CONTINUE_PROMPT: &str = "Please continue.";

/// Assistant tool uses with no matching tool result later in `history`,
/// in history order.
pub fn find_orphaned_tool_calls(history: &[ModelMessage]) -> Vec<ToolCall> {
    let mut answered: HashSet<&str> = HashSet::new();
    let mut orphans = Vec::new();
    for message in history.iter().rev() {
        for result in message.tool_results_iter() {
            answered.insert(result.call_id.as_str());
        }
        if message.role != Role::Assistant {
            continue;
        }
        for call in message.tool_calls().into_iter().rev() {
            if !answered.contains(call.id.as_str()) {
                orphans.push(call.clone());
            }
        }
    }
    orphans.reverse();
    orphans
}

/// Append one user message of placeholder results for every orphaned tool
/// use. Returns the number of placeholders added.
pub fn repair_history(history: &mut Vec<ModelMessage>) -> usize {
    let orphans = find_orphaned_tool_calls(history);
    if orphans.is_empty() {
        return 0;
    }
    let placeholders: Vec<ToolResponse> = orphans
        .iter()
        .map(|call| ToolResponse::success(call, INTERRUPTED_TOOL_OUTPUT))
        .collect();
    let added = placeholders.len();
    history.push(ModelMessage::tool_results(placeholders));
    added
}
