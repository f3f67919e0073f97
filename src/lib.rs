//! Conversational agent sessions.
//!
//! An [`AgentSession`](agent::AgentSession) drives a loop between a
//! [`ModelClient`](provider::ModelClient) and a [`ToolSet`](tools::ToolSet)
//! until the model produces a typed answer. While a run is in flight the
//! caller can queue interrupts, answer questions the model asks, cancel, and
//! later resume the conversation.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use agent_session::prelude::*;
//! use futures::StreamExt;
//!
//! # async fn example(client: Arc<dyn ModelClient>) -> agent_session::error::Result<()> {
//! let model: LanguageModel = "openai:gpt-4o".parse()?;
//! let session = AgentSession::new(client, ToolSet::new().with_ask_user(), SessionConfig::from_env());
//! let mut stream = session.run::<serde_json::Value>("Plan my trip", model).await;
//! while let Some(phase) = stream.next().await {
//!     if let SessionPhase::AwaitingUserInput(question) = &phase {
//!         println!("{question}");
//!         session.reply("Tokyo").await;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod agent_loop;
pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod prelude;
pub mod provider;
pub mod tools;
pub mod types;
