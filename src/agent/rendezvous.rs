//! Single-shot hand-off between a suspended run and the caller's answer.

use tokio::sync::oneshot;

use crate::types::{ToolCall, ToolResponse};

/// The question a suspended run is waiting on.
#[derive(Debug)]
pub(crate) struct PendingQuestion {
    call: ToolCall,
    question: String,
    responder: Option<oneshot::Sender<String>>,
}

impl PendingQuestion {
    pub(crate) fn new(call: ToolCall, question: String) -> (Self, oneshot::Receiver<String>) {
        let (tx, rx) = oneshot::channel();
        let pending = Self {
            call,
            question,
            responder: Some(tx),
        };
        (pending, rx)
    }

    pub(crate) fn question(&self) -> &str {
        &self.question
    }

    /// Tool result that records `answer` against the question call.
    pub(crate) fn answer_response(&self, answer: &str) -> ToolResponse {
        ToolResponse::success(&self.call, answer)
    }

    /// Deliver the answer. Only the first call has any effect; returns
    /// whether the waiting run received it.
    pub(crate) fn resolve(&mut self, answer: String) -> bool {
        match self.responder.take() {
            Some(tx) => tx.send(answer).is_ok(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_at_most_once() {
        let call = ToolCall::new("c1", "ask_user", serde_json::json!({ "question": "Which?" }));
        let (mut pending, rx) = PendingQuestion::new(call, "Which?".into());
        assert_eq!(pending.question(), "Which?");
        assert!(pending.resolve("A".into()));
        assert!(!pending.resolve("B".into()));
        assert_eq!(rx.await.unwrap(), "A");
    }

    #[test]
    fn resolve_after_receiver_dropped_reports_failure() {
        let call = ToolCall::new("c1", "ask_user", serde_json::json!({}));
        let (mut pending, rx) = PendingQuestion::new(call, "q".into());
        drop(rx);
        assert!(!pending.resolve("late".into()));
    }

    #[test]
    fn answer_response_matches_call() {
        let call = ToolCall::new("c9", "ask_user", serde_json::json!({}));
        let (pending, _rx) = PendingQuestion::new(call, "q".into());
        let response = pending.answer_response("yes");
        assert_eq!(response.call_id, "c9");
        assert_eq!(response.output, "yes");
        assert!(!response.is_error);
    }
}
