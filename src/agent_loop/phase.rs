//! Internal loop phase: which kind of model call happens next.

use strum::Display;

/// Decoding attempts after the first failed one in the final-output phase.
pub const MAX_DECODE_RETRIES: usize = 2;

pub(crate) const FINAL_OUTPUT_REQUEST: &str =
    "Please provide your final answer as JSON matching the required schema. \
Respond with the JSON object only.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub(crate) enum LoopPhase {
    /// Tool calls and free text are allowed.
    ToolUse,
    /// Only the structured answer is accepted.
    FinalOutput { retry_count: usize },
}

impl LoopPhase {
    pub(crate) fn is_tool_use(self) -> bool {
        matches!(self, Self::ToolUse)
    }

    /// Phase after a failed decode, or `None` once retries are exhausted.
    pub(crate) fn next_retry(self) -> Option<Self> {
        match self {
            Self::FinalOutput { retry_count } if retry_count < MAX_DECODE_RETRIES => {
                Some(Self::FinalOutput {
                    retry_count: retry_count + 1,
                })
            }
            _ => None,
        }
    }
}

pub(crate) fn decode_retry_request(error: &str) -> String {
    format!(
        "Your previous answer could not be decoded ({error}). \
Reply again with only a JSON object matching the required schema."
    )
}
