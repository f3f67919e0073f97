//! Agent loop primitives (phases, events, the spawned runner).

pub mod events;
pub mod phase;
pub mod runner;

pub use events::{AgentStep, SessionPhase};
pub use phase::MAX_DECODE_RETRIES;
pub use runner::{RunId, SessionStream};

pub(crate) use runner::{empty_stream, failed_stream, spawn_loop, LoopRun, PhaseEmitter};
