//! Core types for agent sessions.

pub mod generation;
pub mod message;

pub use generation::*;
pub use message::*;
