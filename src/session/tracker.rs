//! Session identity tracking
//!
//! Holds the latest backend-issued session id and the queue of context
//! images the user attached ahead of a prompt. Context images are carried
//! implicitly into the next submission when the caller supplies none of its
//! own, and are cleared only when consumed that way; an explicit image set
//! leaves them untouched for a later turn.

/// Tracks the session id and context-image carry-over between turns
#[derive(Debug, Clone, Default)]
pub struct SessionTracker {
    session_id: Option<String>,
    context_images: Option<Vec<String>>,
}

impl SessionTracker {
    /// Create an empty tracker (no session, no context images)
    pub fn new() -> Self {
        Self::default()
    }

    /// The latest session id observed from the backend, if any
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Unconditionally adopt a session id observed on a response
    ///
    /// The backend may re-affirm or rotate the id on any successful
    /// exchange; the tracker always keeps the latest value seen.
    pub fn adopt_session_id(&mut self, id: impl Into<String>) {
        self.session_id = Some(id.into());
    }

    /// Images staged for implicit carry-over into the next prompt
    pub fn context_images(&self) -> Option<&[String]> {
        self.context_images.as_deref()
    }

    /// Stage or clear context images ahead of the next prompt
    pub fn set_context_images(&mut self, images: Option<Vec<String>>) {
        self.context_images = images;
    }

    /// Clear context images only if they were just consumed implicitly
    ///
    /// When the caller supplied its own images (`used_explicit` true) the
    /// staged context is preserved, unconsumed, for a later turn.
    pub fn consume_context_images_if_implicit(&mut self, used_explicit: bool) {
        if !used_explicit {
            self.context_images = None;
        }
    }

    /// Reset all session state (used when history is cleared)
    pub fn reset(&mut self) {
        self.session_id = None;
        self.context_images = None;
    }
}
