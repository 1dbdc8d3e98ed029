//! Concierge - AI assistant chat session engine
//!
//! This library carries a single conversational turn between a client and
//! an assistant backend, and reconciles the response protocol into a
//! stable, orderable message timeline.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `envelope`: the polymorphic wire contract and its decoder
//! - `enrichment`: normalization of payloads into a uniform view model
//! - `session`: the message timeline, session tracker, and chat engine
//! - `transport`: the backend collaborator trait and HTTP implementation
//! - `config`: configuration management and validation
//! - `error`: error types and result aliases
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use concierge::{ChatEngine, Config, HttpChatTransport};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     config.validate()?;
//!
//!     let transport = HttpChatTransport::new(config.transport)?;
//!     let engine = ChatEngine::new(Arc::new(transport));
//!
//!     engine.load_history().await?;
//!     engine.submit_prompt("Find me a quiet room for four", None).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod enrichment;
pub mod envelope;
pub mod error;
pub mod session;
pub mod transport;

// Re-export commonly used types
pub use config::{Config, TransportConfig};
pub use enrichment::{normalize, Enrichment};
pub use envelope::{decode_envelope, decode_history_entry, DecodedTurn, EnvelopeKind, Payload};
pub use error::{ConciergeError, Result};
pub use session::{ChatEngine, ChatMessage, Role, Timeline, TimelineEvent, TimelineObserver};
pub use transport::{ChatTransport, HistoryResponse, HttpChatTransport};

#[cfg(test)]
pub mod test_utils;
