//! Chat message model
//!
//! Defines the atomic unit of the session timeline: a [`ChatMessage`] with
//! a role, Markdown content, an RFC 3339 timestamp, and optional assistant
//! enrichment. The reserved id [`TYPING_MESSAGE_ID`] marks the transient
//! placeholder standing in for an in-flight response; it is never persisted
//! and never counts as a real turn.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::enrichment::Enrichment;

/// Reserved message id of the transient typing placeholder
pub const TYPING_MESSAGE_ID: &str = "typing";

/// Placeholder content shown while the assistant response is in flight
const TYPING_PLACEHOLDER_TEXT: &str = "…";

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User message (prompt)
    User,
    /// Assistant message (response)
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

impl Role {
    /// Parse a role from its wire representation, defaulting to assistant
    ///
    /// History entries occasionally omit or misspell the role; an
    /// unrecognized value reads as assistant so the entry still renders.
    pub fn parse_or_assistant(s: Option<&str>) -> Self {
        match s {
            Some("user") => Self::User,
            _ => Self::Assistant,
        }
    }
}

/// A message in the session timeline
///
/// # Examples
///
/// ```
/// use concierge::session::{ChatMessage, Role};
///
/// let msg = ChatMessage::user("Find me a quiet room");
/// assert_eq!(msg.role, Role::User);
/// assert!(!msg.is_typing());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    /// Unique id within the session; `"typing"` is reserved
    pub id: String,
    /// Who authored the message
    pub role: Role,
    /// Plain/Markdown text
    pub content: String,
    /// RFC 3339 instant; client-set for optimistic messages
    pub timestamp: String,
    /// Normalized enrichment data (assistant messages only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrichment: Option<Enrichment>,
}

impl ChatMessage {
    /// Create an optimistic user message with a fresh id and current time
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: Role::User,
            content: content.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            enrichment: None,
        }
    }

    /// Create a confirmed assistant message
    ///
    /// # Arguments
    ///
    /// * `content` - The response text
    /// * `timestamp` - Server timestamp when present, otherwise time of receipt
    /// * `enrichment` - Normalized enrichment data, if any
    pub fn assistant(
        content: impl Into<String>,
        timestamp: Option<String>,
        enrichment: Option<Enrichment>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: Role::Assistant,
            content: content.into(),
            timestamp: timestamp.unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
            enrichment,
        }
    }

    /// Create the reserved typing placeholder
    pub fn typing_placeholder() -> Self {
        Self {
            id: TYPING_MESSAGE_ID.to_string(),
            role: Role::Assistant,
            content: TYPING_PLACEHOLDER_TEXT.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            enrichment: None,
        }
    }

    /// Returns true if this is the transient typing placeholder
    pub fn is_typing(&self) -> bool {
        self.id == TYPING_MESSAGE_ID
    }
}
