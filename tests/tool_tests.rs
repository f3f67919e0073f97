//! Tests for the tool system.

use async_trait::async_trait;

use agent_session::error::SessionError;
use agent_session::tools::*;

struct Counter {
    parameters: AgentToolParameters,
}

#[async_trait]
impl Tool for Counter {
    fn name(&self) -> &str {
        "count"
    }

    fn description(&self) -> &str {
        "Count the characters of a word"
    }

    fn parameters(&self) -> &AgentToolParameters {
        &self.parameters
    }

    async fn execute(
        &self,
        args: &ToolArguments,
        ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, SessionError> {
        if ctx.is_cancelled() {
            return Err(SessionError::tool_execution("count", "cancelled"));
        }
        let word = args.get_str("word")?;
        Ok(serde_json::json!({ "word": word, "length": word.len() }))
    }
}

fn counter() -> Counter {
    Counter {
        parameters: AgentToolParameters::object()
            .string("word", "Word to count", true)
            .build(),
    }
}

#[test]
fn parameter_builder_constructs_schema() {
    let params = AgentToolParameters::object()
        .string("query", "Search query", true)
        .number("limit", "Max results", false)
        .boolean("verbose", "Enable verbose output", false)
        .string_enum("format", "Output format", &["json", "text"], false)
        .build();

    let schema = &params.schema;
    assert_eq!(schema["type"], "object");
    assert_eq!(schema["properties"]["limit"]["type"], "number");
    assert_eq!(schema["properties"]["format"]["enum"].as_array().unwrap().len(), 2);
    assert_eq!(schema["required"], serde_json::json!(["query"]));
}

#[tokio::test]
async fn custom_tool_output_is_rendered_as_json_text() {
    let tools = ToolSet::new().with_tool(counter());
    let output = tools
        .execute(
            "count",
            &serde_json::json!({ "word": "tokyo" }),
            &ToolExecutionContext::default(),
        )
        .await
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["length"], 5);
}

#[tokio::test]
async fn string_encoded_arguments_are_accepted() {
    let tools = ToolSet::new().with_tool(counter());
    let output = tools
        .execute(
            "count",
            &serde_json::json!("{\"word\":\"abc\"}"),
            &ToolExecutionContext::default(),
        )
        .await
        .unwrap();
    assert!(output.contains("\"length\":3"));
}

#[tokio::test]
async fn tools_observe_cancellation_cooperatively() {
    let tools = ToolSet::new().with_tool(counter());
    let ctx = ToolExecutionContext::default();
    ctx.cancel.cancel();
    let err = tools
        .execute("count", &serde_json::json!({ "word": "abc" }), &ctx)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("cancelled"));
}

#[tokio::test]
async fn missing_argument_is_a_tool_error() {
    let tools = ToolSet::new().with_tool(counter());
    let err = tools
        .execute("count", &serde_json::json!({}), &ToolExecutionContext::default())
        .await
        .unwrap_err();
    assert!(!err.is_loop_fatal());
}

#[test]
fn ask_user_definition_is_advertised_alongside_tools() {
    let tools = ToolSet::new().with_tool(counter()).with_ask_user();
    assert_eq!(tools.names(), vec!["count", ASK_USER_TOOL_NAME]);
    assert!(tools.contains(ASK_USER_TOOL_NAME));
}
