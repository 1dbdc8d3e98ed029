//! Base transport trait and common types for Concierge
//!
//! This module defines the [`ChatTransport`] trait that all backend
//! transports must implement. The engine consumes exactly three operations
//! from the transport: send a chat message, fetch prior history, and clear
//! history. Each must fail with an error on transport or server problems
//! rather than returning a malformed body; envelope decoding itself is the
//! engine's job, so the send operation returns the raw JSON-decoded value.

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Prior conversation state returned by the history operation
#[derive(Debug, Clone, Default)]
pub struct HistoryResponse {
    /// Session id of the stored conversation, when one exists
    pub session_id: Option<String>,
    /// Raw envelope values for each prior message, oldest first
    pub messages: Vec<Value>,
}

/// Transport trait for assistant backends
///
/// Implementations are free to speak any wire protocol; the engine only
/// requires these three async operations.
///
/// # Examples
///
/// ```no_run
/// use concierge::transport::{ChatTransport, HistoryResponse};
/// use concierge::error::Result;
/// use async_trait::async_trait;
///
/// struct EchoTransport;
///
/// #[async_trait]
/// impl ChatTransport for EchoTransport {
///     async fn send_chat_message(
///         &self,
///         content: &str,
///         _current_page: Option<&str>,
///         _images: Option<&[String]>,
///     ) -> Result<serde_json::Value> {
///         Ok(serde_json::json!({ "message": content }))
///     }
///
///     async fn fetch_chat_history(&self) -> Result<HistoryResponse> {
///         Ok(HistoryResponse::default())
///     }
///
///     async fn clear_chat_history(&self) -> Result<()> {
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send one user prompt to the assistant backend
    ///
    /// # Arguments
    ///
    /// * `content` - The prompt text
    /// * `current_page` - Best-effort caller view identity; optional and
    ///   never required for the call to proceed
    /// * `images` - Image references accompanying the prompt
    ///
    /// # Returns
    ///
    /// The raw JSON-decoded response envelope
    ///
    /// # Errors
    ///
    /// Fails on transport or server error; never returns a malformed body
    async fn send_chat_message(
        &self,
        content: &str,
        current_page: Option<&str>,
        images: Option<&[String]>,
    ) -> Result<Value>;

    /// Fetch the full prior message list for the current session
    async fn fetch_chat_history(&self) -> Result<HistoryResponse>;

    /// Clear the stored conversation history
    ///
    /// # Errors
    ///
    /// Fails on transport or server error; the engine leaves its state
    /// untouched in that case.
    async fn clear_chat_history(&self) -> Result<()>;
}
