//! HTTP transport implementation for Concierge
//!
//! This module implements the [`ChatTransport`] trait over HTTP, connecting
//! to an assistant backend that exposes send/history/clear endpoints under
//! a configurable base URL. Session affinity is expected to ride on
//! cookies or a gateway, so no session id is propagated explicitly here.

use crate::config::TransportConfig;
use crate::error::{ConciergeError, Result};
use crate::transport::base::{ChatTransport, HistoryResponse};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// HTTP chat transport
///
/// # Examples
///
/// ```no_run
/// use concierge::config::TransportConfig;
/// use concierge::transport::{ChatTransport, HttpChatTransport};
///
/// # async fn example() -> concierge::error::Result<()> {
/// let config = TransportConfig {
///     base_url: "http://localhost:8080".to_string(),
///     timeout_secs: 30,
/// };
/// let transport = HttpChatTransport::new(config)?;
/// let envelope = transport.send_chat_message("Find a room", None, None).await?;
/// # Ok(())
/// # }
/// ```
pub struct HttpChatTransport {
    client: Client,
    base_url: String,
}

/// Request body for the send endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendRequest<'a> {
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_page: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    images: Option<&'a [String]>,
}

/// Response body of the history endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryWire {
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    messages: Vec<Value>,
}

impl HttpChatTransport {
    /// Create a new HTTP chat transport
    ///
    /// # Arguments
    ///
    /// * `config` - Transport configuration with base URL and timeout
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: TransportConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("concierge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ConciergeError::Transport(format!("Failed to create HTTP client: {}", e))
            })?;

        tracing::info!("Initialized HTTP chat transport: base_url={}", config.base_url);

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The configured base URL (no trailing slash)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Map a non-success response into a transport error with body context
    async fn error_from_response(response: reqwest::Response) -> anyhow::Error {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        tracing::error!("Chat backend returned {}: {}", status, error_text);
        ConciergeError::Transport(format!("server returned {}: {}", status, error_text)).into()
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn send_chat_message(
        &self,
        content: &str,
        current_page: Option<&str>,
        images: Option<&[String]>,
    ) -> Result<Value> {
        let url = self.endpoint("/api/chat/message");
        tracing::debug!(
            "Sending chat message: {} chars, page={:?}, images={}",
            content.len(),
            current_page,
            images.map(|i| i.len()).unwrap_or(0)
        );

        let request = SendRequest {
            content,
            current_page,
            images,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ConciergeError::Transport(format!("send failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let envelope: Value = response
            .json()
            .await
            .map_err(|e| ConciergeError::Transport(format!("invalid response body: {}", e)))?;
        Ok(envelope)
    }

    async fn fetch_chat_history(&self) -> Result<HistoryResponse> {
        let url = self.endpoint("/api/chat/history");
        tracing::debug!("Fetching chat history from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ConciergeError::Transport(format!("history fetch failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let wire: HistoryWire = response
            .json()
            .await
            .map_err(|e| ConciergeError::Transport(format!("invalid history body: {}", e)))?;

        tracing::debug!("Fetched {} history messages", wire.messages.len());
        Ok(HistoryResponse {
            session_id: wire.session_id,
            messages: wire.messages,
        })
    }

    async fn clear_chat_history(&self) -> Result<()> {
        let url = self.endpoint("/api/chat/history");
        tracing::debug!("Clearing chat history at {}", url);

        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| ConciergeError::Transport(format!("clear failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        Ok(())
    }
}
