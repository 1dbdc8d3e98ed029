//! Session timeline: the ordered, observable message sequence
//!
//! The timeline owns the ordered sequence of [`ChatMessage`]s and exposes
//! the only sanctioned mutation operations. It is a strictly append/replace
//! structure; no operation reorders existing entries. At most one typing
//! placeholder exists at any time, and when present it is the last element.
//!
//! Observers subscribe through [`TimelineObserver`] and receive a
//! [`TimelineEvent`] after every mutating operation, decoupling UI or
//! logging layers from the engine.

use std::sync::Arc;

use crate::error::{ConciergeError, Result};
use crate::session::message::ChatMessage;

/// Notification emitted after each timeline mutation
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineEvent {
    /// A message was appended (user message or typing placeholder)
    Appended { id: String },
    /// The typing placeholder was replaced by the final assistant message
    TypingResolved { id: String },
    /// The typing placeholder was removed without replacement
    TypingRemoved,
    /// The timeline was replaced wholesale (history load or clear)
    Replaced { len: usize },
}

/// Subscription interface for timeline change notifications
pub trait TimelineObserver: Send + Sync {
    /// Called after every mutating timeline operation
    fn timeline_changed(&self, event: &TimelineEvent);
}

/// Ordered, mutable sequence of chat messages
///
/// # Examples
///
/// ```
/// use concierge::session::Timeline;
///
/// let mut timeline = Timeline::new();
/// timeline.append_user("Find me a quiet room");
/// assert_eq!(timeline.len(), 1);
/// ```
#[derive(Default)]
pub struct Timeline {
    messages: Vec<ChatMessage>,
    observers: Vec<Arc<dyn TimelineObserver>>,
}

impl std::fmt::Debug for Timeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timeline")
            .field("messages", &self.messages)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Timeline {
    /// Create an empty timeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe an observer to change notifications
    pub fn subscribe(&mut self, observer: Arc<dyn TimelineObserver>) {
        self.observers.push(observer);
    }

    fn notify(&self, event: TimelineEvent) {
        for observer in &self.observers {
            observer.timeline_changed(&event);
        }
    }

    /// Read-only snapshot of the ordered messages
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Number of messages currently on the timeline
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if the timeline holds no messages
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Returns true if the typing placeholder is outstanding
    pub fn has_typing(&self) -> bool {
        self.messages.iter().any(|m| m.is_typing())
    }

    /// Append a user message with a fresh id and current timestamp
    ///
    /// Always succeeds; returns a clone of the created message.
    pub fn append_user(&mut self, content: impl Into<String>) -> ChatMessage {
        let message = ChatMessage::user(content);
        let created = message.clone();
        self.messages.push(message);
        self.notify(TimelineEvent::Appended {
            id: created.id.clone(),
        });
        created
    }

    /// Append the single reserved typing placeholder
    ///
    /// # Errors
    ///
    /// Returns [`ConciergeError::SubmissionInFlight`] if a placeholder is
    /// already outstanding, preserving the at-most-one invariant.
    pub fn append_typing_placeholder(&mut self) -> Result<()> {
        if self.has_typing() {
            return Err(ConciergeError::SubmissionInFlight.into());
        }
        let placeholder = ChatMessage::typing_placeholder();
        let id = placeholder.id.clone();
        self.messages.push(placeholder);
        self.notify(TimelineEvent::Appended { id });
        Ok(())
    }

    /// Atomically replace the typing placeholder with the final message
    ///
    /// Removes the placeholder by id and appends `final_message` in its
    /// place, preserving the relative order of everything before it. If no
    /// placeholder exists (a race), the message is still appended at the
    /// end.
    pub fn resolve_typing(&mut self, final_message: ChatMessage) {
        self.messages.retain(|m| !m.is_typing());
        let id = final_message.id.clone();
        self.messages.push(final_message);
        self.notify(TimelineEvent::TypingResolved { id });
    }

    /// Remove the typing placeholder without replacement
    ///
    /// Used on submission failure; a no-op when no placeholder exists.
    pub fn remove_typing(&mut self) {
        let before = self.messages.len();
        self.messages.retain(|m| !m.is_typing());
        if self.messages.len() != before {
            self.notify(TimelineEvent::TypingRemoved);
        }
    }

    /// Replace the entire timeline (history load, or clear with `[]`)
    pub fn replace_all(&mut self, messages: Vec<ChatMessage>) {
        self.messages = messages;
        self.notify(TimelineEvent::Replaced {
            len: self.messages.len(),
        });
    }
}
