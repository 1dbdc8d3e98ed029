//! Test utilities for Concierge
//!
//! This module provides a scripted transport for exercising the engine in
//! unit tests: responses are queued ahead of time, every send call is
//! recorded for assertion, and a blocking mode lets tests hold a
//! submission open to probe in-flight behavior.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{ConciergeError, Result};
use crate::transport::{ChatTransport, HistoryResponse};

/// One recorded `send_chat_message` invocation
#[derive(Debug, Clone, PartialEq)]
pub struct SentCall {
    pub content: String,
    pub current_page: Option<String>,
    pub images: Option<Vec<String>>,
}

/// A transport whose responses are scripted ahead of time
///
/// Send responses are consumed in order; running out of script is a test
/// bug and fails the call. In blocking mode a send parks until the test
/// releases it, which lets tests observe the typing placeholder while a
/// submission is suspended, or abort the submission mid-flight.
pub struct ScriptedTransport {
    send_responses: Mutex<VecDeque<std::result::Result<Value, String>>>,
    history: Mutex<Option<std::result::Result<HistoryResponse, String>>>,
    clear_error: Mutex<Option<String>>,
    calls: Mutex<Vec<SentCall>>,
    blocking: bool,
    send_started: AtomicBool,
    release_value: Mutex<Option<Value>>,
}

impl ScriptedTransport {
    fn empty() -> Self {
        Self {
            send_responses: Mutex::new(VecDeque::new()),
            history: Mutex::new(None),
            clear_error: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            blocking: false,
            send_started: AtomicBool::new(false),
            release_value: Mutex::new(None),
        }
    }

    /// Script a sequence of send responses, consumed in order
    pub fn with_send_responses(responses: Vec<std::result::Result<Value, String>>) -> Self {
        let transport = Self::empty();
        *transport.send_responses.lock().unwrap() = responses.into();
        transport
    }

    /// Script the history fetch result
    pub fn with_history(history: std::result::Result<HistoryResponse, String>) -> Self {
        let transport = Self::empty();
        *transport.history.lock().unwrap() = Some(history);
        transport
    }

    /// A transport whose send parks until [`Self::release_send`] is called
    pub fn blocking() -> Self {
        Self {
            blocking: true,
            ..Self::empty()
        }
    }

    /// Make `clear_chat_history` succeed (the default)
    pub fn clear_succeeds(self) -> Self {
        *self.clear_error.lock().unwrap() = None;
        self
    }

    /// Make `clear_chat_history` fail with the given message
    pub fn clear_fails(self, message: &str) -> Self {
        *self.clear_error.lock().unwrap() = Some(message.to_string());
        self
    }

    /// All send calls recorded so far
    pub fn sent_calls(&self) -> Vec<SentCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Wait until a blocking send has been entered
    pub async fn wait_for_send_started(&self) {
        while !self.send_started.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    /// Release a parked blocking send with the given envelope
    pub fn release_send(&self, envelope: Value) {
        *self.release_value.lock().unwrap() = Some(envelope);
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn send_chat_message(
        &self,
        content: &str,
        current_page: Option<&str>,
        images: Option<&[String]>,
    ) -> Result<Value> {
        self.calls.lock().unwrap().push(SentCall {
            content: content.to_string(),
            current_page: current_page.map(str::to_string),
            images: images.map(<[String]>::to_vec),
        });

        if self.blocking {
            self.send_started.store(true, Ordering::SeqCst);
            loop {
                if let Some(value) = self.release_value.lock().unwrap().take() {
                    return Ok(value);
                }
                // Sleep is the cancellation point for abort tests.
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        }

        match self.send_responses.lock().unwrap().pop_front() {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(ConciergeError::Transport(message).into()),
            None => Err(ConciergeError::Transport("no scripted response".to_string()).into()),
        }
    }

    async fn fetch_chat_history(&self) -> Result<HistoryResponse> {
        match self.history.lock().unwrap().take() {
            Some(Ok(history)) => Ok(history),
            Some(Err(message)) => Err(ConciergeError::Transport(message).into()),
            None => Ok(HistoryResponse::default()),
        }
    }

    async fn clear_chat_history(&self) -> Result<()> {
        match self.clear_error.lock().unwrap().clone() {
            Some(message) => Err(ConciergeError::Transport(message).into()),
            None => Ok(()),
        }
    }
}
