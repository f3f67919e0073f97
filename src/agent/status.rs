//! Public session lifecycle status and its guard table.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::agent_loop::AgentStep;
use crate::error::SessionError;

/// Lifecycle status of a session; decides which operations are legal.
///
/// | operation   | legal from                                   |
/// |-------------|----------------------------------------------|
/// | `run`       | `Idle`                                       |
/// | `resume`    | `Idle` (non-empty history), `Paused`, `Failed` |
/// | `interrupt` | `Running`                                    |
/// | `reply`     | `AwaitingUserInput`                          |
/// | `cancel`    | `Running`, `AwaitingUserInput`               |
/// | `clear`     | `Paused`, `Failed`                           |
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Display)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Idle,
    Running(AgentStep),
    AwaitingUserInput(String),
    Paused,
    Failed(String),
}

impl SessionStatus {
    /// A run owns the session (running or suspended on a question).
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Running(_) | Self::AwaitingUserInput(_))
    }

    pub fn can_run(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn can_resume(&self, history_len: usize) -> bool {
        match self {
            Self::Idle => history_len > 0,
            Self::Paused | Self::Failed(_) => true,
            Self::Running(_) | Self::AwaitingUserInput(_) => false,
        }
    }

    pub fn can_interrupt(&self) -> bool {
        matches!(self, Self::Running(_))
    }

    pub fn can_reply(&self) -> bool {
        matches!(self, Self::AwaitingUserInput(_))
    }

    pub fn can_cancel(&self) -> bool {
        self.is_active()
    }

    pub fn can_clear(&self) -> bool {
        matches!(self, Self::Paused | Self::Failed(_))
    }

    /// `Ok(false)` means the call is ignored; only an active session is an
    /// error.
    pub(crate) fn check_run(&self) -> Result<bool, SessionError> {
        if self.is_active() {
            return Err(SessionError::SessionAlreadyRunning);
        }
        Ok(self.can_run())
    }

    pub(crate) fn check_resume(&self, history_len: usize) -> Result<(), SessionError> {
        if self.can_resume(history_len) {
            Ok(())
        } else if self.is_active() {
            Err(SessionError::SessionAlreadyRunning)
        } else {
            Err(SessionError::InvalidState(
                "nothing to resume: conversation history is empty".into(),
            ))
        }
    }
}
