//! Chat engine: prompt submission pipeline and history loader
//!
//! [`ChatEngine`] orchestrates one conversational turn end to end: it
//! optimistically appends the user message and a typing placeholder to the
//! timeline, calls the transport, decodes and normalizes the response, and
//! replaces the placeholder with the final assistant message. On failure
//! only the placeholder is rolled back; the user's own message stays.
//!
//! The engine is a cloneable handle over shared state so that read-only
//! snapshots (`messages`, status flags) remain observable while a transport
//! call is suspended. All mutations happen under a single lock held only
//! across synchronous sections, never across an await point.
//!
//! Overlapping submissions are rejected: a second `submit_prompt` while a
//! typing placeholder is outstanding fails fast with
//! [`ConciergeError::SubmissionInFlight`] and leaves all state untouched.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use metrics::{histogram, increment_counter};
use serde_json::Value;

use crate::enrichment::normalize;
use crate::envelope::{decode_envelope, decode_history_entry};
use crate::error::{ConciergeError, Result};
use crate::session::message::{ChatMessage, Role};
use crate::session::timeline::{Timeline, TimelineObserver};
use crate::session::tracker::SessionTracker;
use crate::transport::ChatTransport;

/// Mutable engine state, owned exclusively by the engine
///
/// Exposed to callers only through read-only snapshots and the operations
/// on [`ChatEngine`]; no external caller can mutate a message or the
/// session id directly.
#[derive(Debug, Default)]
struct EngineState {
    timeline: Timeline,
    tracker: SessionTracker,
    is_loading: bool,
    is_thinking: bool,
    error: Option<String>,
    current_page: Option<String>,
}

/// Removes a dangling typing placeholder if a submission is dropped
///
/// The transport call is the only suspension point in a submission. If the
/// caller aborts there, this guard still drives the turn to a terminal
/// state instead of leaving the placeholder on the timeline.
struct TypingGuard {
    state: Arc<Mutex<EngineState>>,
    armed: bool,
}

impl TypingGuard {
    fn new(state: Arc<Mutex<EngineState>>) -> Self {
        Self { state, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for TypingGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        state.timeline.remove_typing();
        state.is_thinking = false;
        state.error = Some("Submission cancelled before a response arrived".to_string());
        tracing::warn!("Submission dropped mid-flight; typing placeholder removed");
    }
}

/// The chat session engine
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use concierge::config::TransportConfig;
/// use concierge::session::ChatEngine;
/// use concierge::transport::HttpChatTransport;
///
/// # async fn example() -> concierge::error::Result<()> {
/// let transport = HttpChatTransport::new(TransportConfig::default())?;
/// let engine = ChatEngine::new(Arc::new(transport));
///
/// engine.load_history().await?;
/// engine.submit_prompt("Find me a quiet room", None).await?;
/// for message in engine.messages() {
///     println!("{}: {}", message.role, message.content);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ChatEngine {
    transport: Arc<dyn ChatTransport>,
    state: Arc<Mutex<EngineState>>,
}

impl ChatEngine {
    /// Create an engine over the given transport with an empty session
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        Self {
            transport,
            state: Arc::new(Mutex::new(EngineState::default())),
        }
    }

    fn state(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Ordered read-only snapshot of the timeline
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.state().timeline.messages().to_vec()
    }

    /// True while a history load is in flight
    pub fn is_loading(&self) -> bool {
        self.state().is_loading
    }

    /// True while a prompt submission awaits its response
    pub fn is_thinking(&self) -> bool {
        self.state().is_thinking
    }

    /// Last surfaced error, cleared by the next successful operation
    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    /// Latest backend-issued session id, if any
    pub fn session_id(&self) -> Option<String> {
        self.state().tracker.session_id().map(str::to_string)
    }

    /// Images currently staged for implicit carry-over
    pub fn context_images(&self) -> Option<Vec<String>> {
        self.state().tracker.context_images().map(<[String]>::to_vec)
    }

    /// Stage or clear images for the next prompt
    pub fn set_context_images(&self, images: Option<Vec<String>>) {
        self.state().tracker.set_context_images(images);
    }

    /// Record the caller's current view identity as turn metadata
    pub fn set_current_page(&self, page: Option<String>) {
        self.state().current_page = page;
    }

    /// Subscribe an observer to timeline change notifications
    pub fn subscribe(&self, observer: Arc<dyn TimelineObserver>) {
        self.state().timeline.subscribe(observer);
    }

    /// Submit one prompt and reconcile the response into the timeline
    ///
    /// An empty/whitespace prompt with no images is a caller-facing no-op.
    /// A submission while another is in flight is rejected with
    /// [`ConciergeError::SubmissionInFlight`]. On transport failure the
    /// typing placeholder is removed, the error slot is set, and the user's
    /// message stays on the timeline.
    ///
    /// # Arguments
    ///
    /// * `content` - The prompt text
    /// * `images` - Explicit image references; when `None` (or empty), any
    ///   staged context images are carried over implicitly and consumed
    pub async fn submit_prompt(&self, content: &str, images: Option<Vec<String>>) -> Result<()> {
        let explicit = images.filter(|i| !i.is_empty());
        if content.trim().is_empty() && explicit.is_none() {
            tracing::debug!("Ignoring empty prompt submission");
            return Ok(());
        }

        let used_explicit = explicit.is_some();
        let (effective_images, current_page) = {
            let mut state = self.state();
            if state.is_thinking || state.timeline.has_typing() {
                tracing::debug!("Rejecting overlapping prompt submission");
                return Err(ConciergeError::SubmissionInFlight.into());
            }

            state.timeline.append_user(content);
            state.timeline.append_typing_placeholder()?;
            state.is_thinking = true;

            let effective = explicit
                .or_else(|| state.tracker.context_images().map(<[String]>::to_vec));
            (effective, state.current_page.clone())
        };

        increment_counter!("concierge_submissions_total");
        let started = Instant::now();

        let mut guard = TypingGuard::new(Arc::clone(&self.state));
        let result = self
            .transport
            .send_chat_message(content, current_page.as_deref(), effective_images.as_deref())
            .await;
        guard.disarm();

        match result {
            Ok(raw) => {
                let turn = decode_envelope(&raw);
                let enrichment = normalize(&turn.body);
                let message = ChatMessage::assistant(turn.text, turn.timestamp, enrichment);

                let mut state = self.state();
                state.timeline.resolve_typing(message);
                if let Some(id) = turn.session_id {
                    state.tracker.adopt_session_id(id);
                }
                state.tracker.consume_context_images_if_implicit(used_explicit);
                state.is_thinking = false;
                state.error = None;

                histogram!(
                    "concierge_turn_duration_seconds",
                    started.elapsed().as_secs_f64()
                );
                tracing::debug!("Prompt resolved in {:?}", started.elapsed());
                Ok(())
            }
            Err(e) => {
                let mut state = self.state();
                state.timeline.remove_typing();
                state.is_thinking = false;
                state.error = Some(e.to_string());

                increment_counter!("concierge_submission_failures_total");
                tracing::warn!("Prompt submission failed: {}", e);
                Err(e)
            }
        }
    }

    /// Load prior history, decoding each entry exactly like a live turn
    ///
    /// Seeds the timeline wholesale and adopts the returned session id. On
    /// failure the timeline is left untouched and the error is surfaced.
    pub async fn load_history(&self) -> Result<()> {
        {
            let mut state = self.state();
            state.is_loading = true;
            state.error = None;
        }

        increment_counter!("concierge_history_loads_total");
        match self.transport.fetch_chat_history().await {
            Ok(history) => {
                let messages: Vec<ChatMessage> =
                    history.messages.iter().map(history_message).collect();

                let mut state = self.state();
                tracing::info!("Loaded {} history messages", messages.len());
                state.timeline.replace_all(messages);
                if let Some(id) = history.session_id {
                    state.tracker.adopt_session_id(id);
                }
                state.is_loading = false;
                Ok(())
            }
            Err(e) => {
                let mut state = self.state();
                state.is_loading = false;
                state.error = Some(e.to_string());
                tracing::warn!("History load failed: {}", e);
                Err(e)
            }
        }
    }

    /// Clear the stored conversation, emptying the local session on success
    ///
    /// On transport failure the timeline, session id and context images are
    /// all left unchanged and the error is surfaced.
    pub async fn clear_history(&self) -> Result<()> {
        if let Err(e) = self.transport.clear_chat_history().await {
            let mut state = self.state();
            state.error = Some(e.to_string());
            tracing::warn!("History clear failed: {}", e);
            return Err(e);
        }

        let mut state = self.state();
        state.timeline.replace_all(Vec::new());
        state.tracker.reset();
        state.error = None;
        tracing::info!("Chat history cleared");
        Ok(())
    }
}

/// Build a timeline message from one raw history entry
///
/// Missing ids are freshly generated, unknown roles read as assistant, and
/// a missing timestamp falls back to the time of receipt.
fn history_message(raw: &Value) -> ChatMessage {
    let entry = decode_history_entry(raw);
    let enrichment = normalize(&entry.turn.body);
    ChatMessage {
        id: entry
            .id
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        role: Role::parse_or_assistant(entry.role.as_deref()),
        content: entry.turn.text,
        timestamp: entry
            .turn
            .timestamp
            .unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
        enrichment,
    }
}
