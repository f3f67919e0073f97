use futures::future;
use tokio_util::sync::CancellationToken;

use crate::error::SessionError;
use crate::tools::ask_user::{is_ask_user_call, question_from_call};
use crate::tools::{ToolExecutionContext, ToolSet};
use crate::types::{ToolCall, ToolResponse};

pub(super) const EXTRA_QUESTION_OUTPUT: &str =
    "Only one question can be asked at a time. Wait for the answer to the first question \
before asking another.";

/// What to do with one call of a batch.
#[derive(Debug)]
pub(super) enum PlannedCall {
    /// Run the tool.
    Execute,
    /// Suspend the run on this question.
    Question(String),
    /// Answered without running anything.
    Resolved(ToolResponse),
}

/// Classify `call`; only the first well-formed question of a batch suspends.
pub(super) fn plan_call(call: &ToolCall, question_taken: &mut bool) -> PlannedCall {
    if !is_ask_user_call(call) {
        return PlannedCall::Execute;
    }
    if *question_taken {
        return PlannedCall::Resolved(ToolResponse::error(call, EXTRA_QUESTION_OUTPUT));
    }
    match question_from_call(call) {
        Ok(question) => {
            *question_taken = true;
            PlannedCall::Question(question)
        }
        Err(err) => PlannedCall::Resolved(ToolResponse::error(call, err.to_string())),
    }
}

/// Execute one call; every failure becomes an error result.
pub(super) async fn execute_tool_call(
    tools: &ToolSet,
    call: &ToolCall,
    cancel: CancellationToken,
) -> ToolResponse {
    let ctx = ToolExecutionContext::for_call(call, cancel);
    match tools.execute(&call.name, &call.arguments, &ctx).await {
        Ok(output) => ToolResponse::success(call, output),
        Err(error) => {
            tracing::warn!(
                tool = %call.name,
                call_id = %call.id,
                error = %error,
                "tool call failed"
            );
            ToolResponse::error(call, failure_output(&error))
        }
    }
}

/// Run a planned batch concurrently; results come back in call order.
/// Questions produce no result here.
pub(super) async fn execute_planned_calls(
    tools: &ToolSet,
    batch: Vec<(ToolCall, PlannedCall)>,
    cancel: &CancellationToken,
) -> Vec<ToolResponse> {
    let futures = batch.into_iter().map(|(call, plan)| {
        let cancel = cancel.child_token();
        async move {
            match plan {
                PlannedCall::Execute => Some(execute_tool_call(tools, &call, cancel).await),
                PlannedCall::Resolved(response) => Some(response),
                PlannedCall::Question(_) => None,
            }
        }
    });
    future::join_all(futures).await.into_iter().flatten().collect()
}

fn failure_output(error: &SessionError) -> String {
    match error {
        SessionError::ToolNotFound(name) => format!("Error: tool '{name}' is not available"),
        other => format!("Error: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{AgentTool, AgentToolParameters, ASK_USER_TOOL_NAME};

    fn tools() -> ToolSet {
        ToolSet::new()
            .with_tool(AgentTool::new(
                "lookup",
                "Look up a value",
                AgentToolParameters::empty(),
                |_args, _ctx| async move { Ok(serde_json::json!("42")) },
            ))
            .with_tool(AgentTool::new(
                "broken",
                "Always fails",
                AgentToolParameters::empty(),
                |_args, _ctx| async move {
                    Err(SessionError::tool_execution("broken", "disk on fire"))
                },
            ))
    }

    fn ask(id: &str, question: serde_json::Value) -> ToolCall {
        ToolCall::new(id, ASK_USER_TOOL_NAME, serde_json::json!({ "question": question }))
    }

    #[test]
    fn only_first_question_suspends() {
        let mut taken = false;
        assert!(matches!(
            plan_call(&ask("q1", "Which?".into()), &mut taken),
            PlannedCall::Question(q) if q == "Which?"
        ));
        match plan_call(&ask("q2", "And?".into()), &mut taken) {
            PlannedCall::Resolved(response) => {
                assert!(response.is_error);
                assert_eq!(response.call_id, "q2");
                assert_eq!(response.output, EXTRA_QUESTION_OUTPUT);
            }
            other => panic!("expected resolved, got {other:?}"),
        }
    }

    #[test]
    fn malformed_question_is_answered_with_error() {
        let mut taken = false;
        let planned = plan_call(&ask("q1", serde_json::json!("  ")), &mut taken);
        assert!(matches!(planned, PlannedCall::Resolved(r) if r.is_error));
        assert!(!taken);
    }

    #[test]
    fn ordinary_calls_execute() {
        let mut taken = true;
        let call = ToolCall::new("c1", "lookup", serde_json::json!({}));
        assert!(matches!(plan_call(&call, &mut taken), PlannedCall::Execute));
    }

    #[tokio::test]
    async fn failures_become_error_results() {
        let tools = tools();
        let cancel = CancellationToken::new();
        let missing = ToolCall::new("c1", "nope", serde_json::json!({}));
        let response = execute_tool_call(&tools, &missing, cancel.clone()).await;
        assert!(response.is_error);
        assert!(response.output.contains("nope"));

        let broken = ToolCall::new("c2", "broken", serde_json::json!({}));
        let response = execute_tool_call(&tools, &broken, cancel).await;
        assert!(response.is_error);
        assert!(response.output.contains("disk on fire"));
    }

    #[tokio::test]
    async fn planned_batch_keeps_call_order_and_skips_questions() {
        let tools = tools();
        let mut taken = false;
        let batch: Vec<(ToolCall, PlannedCall)> = vec![
            ToolCall::new("a", "broken", serde_json::json!({})),
            ask("q", "Which?".into()),
            ToolCall::new("b", "lookup", serde_json::json!({})),
            ask("q2", "And?".into()),
        ]
        .into_iter()
        .map(|call| {
            let plan = plan_call(&call, &mut taken);
            (call, plan)
        })
        .collect();
        let results = execute_planned_calls(&tools, batch, &CancellationToken::new()).await;
        let ids: Vec<&str> = results.iter().map(|r| r.call_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "q2"]);
        assert!(results[0].is_error);
        assert_eq!(results[1].output, "42");
        assert!(results[2].is_error);
    }
}
