//! Tests for the error system.

use agent_session::error::*;

#[test]
fn error_helper_mappings_are_stable_for_major_variants() {
    struct Case {
        error: SessionError,
        expected_category: ErrorCategory,
        expected_loop_fatal: bool,
    }

    let serde_error = serde_json::from_str::<serde_json::Value>("{not-json}").unwrap_err();

    let cases = vec![
        Case {
            error: SessionError::SessionAlreadyRunning,
            expected_category: ErrorCategory::Session,
            expected_loop_fatal: true,
        },
        Case {
            error: SessionError::MaxStepsExceeded { steps: 20 },
            expected_category: ErrorCategory::Limit,
            expected_loop_fatal: true,
        },
        Case {
            error: SessionError::ToolNotFound("lookup".into()),
            expected_category: ErrorCategory::Tool,
            expected_loop_fatal: false,
        },
        Case {
            error: SessionError::tool_execution("lookup", "timeout"),
            expected_category: ErrorCategory::Tool,
            expected_loop_fatal: false,
        },
        Case {
            error: SessionError::output_decoding("expected value at line 1"),
            expected_category: ErrorCategory::Decoding,
            expected_loop_fatal: true,
        },
        Case {
            error: SessionError::model_client(SessionError::Configuration("no key".into())),
            expected_category: ErrorCategory::ModelClient,
            expected_loop_fatal: true,
        },
        Case {
            error: SessionError::from(serde_error),
            expected_category: ErrorCategory::Serialization,
            expected_loop_fatal: true,
        },
    ];

    for case in cases {
        assert_eq!(case.error.category(), case.expected_category, "{}", case.error);
        assert_eq!(case.error.is_loop_fatal(), case.expected_loop_fatal, "{}", case.error);
    }
}

#[test]
fn already_running_message_is_stable() {
    assert_eq!(
        SessionError::SessionAlreadyRunning.to_string(),
        "session already running"
    );
}

#[test]
fn tool_execution_message_names_the_tool() {
    let err = SessionError::tool_execution("lookup", "timeout");
    assert_eq!(err.to_string(), "Tool execution error: lookup: timeout");
}
