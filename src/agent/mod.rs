//! Agent sessions: status machine, shared state and the public handle.

pub(crate) mod interrupts;
pub mod repair;
pub(crate) mod rendezvous;
pub mod session;
pub(crate) mod state;
pub mod status;

pub use session::AgentSession;
pub use status::SessionStatus;
