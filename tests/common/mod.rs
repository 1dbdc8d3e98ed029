//! Shared helpers for Concierge integration tests

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use concierge::error::{ConciergeError, Result};
use concierge::transport::{ChatTransport, HistoryResponse};

/// Initialize test logging once; safe to call from every test
#[allow(dead_code)]
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}

/// One recorded send invocation
#[derive(Debug, Clone, PartialEq)]
#[allow(dead_code)]
pub struct SentCall {
    pub content: String,
    pub current_page: Option<String>,
    pub images: Option<Vec<String>>,
}

/// A transport with pre-scripted responses that records every send call
#[derive(Default)]
#[allow(dead_code)]
pub struct RecordingTransport {
    send_responses: Mutex<VecDeque<std::result::Result<Value, String>>>,
    history: Mutex<Option<std::result::Result<HistoryResponse, String>>>,
    clear_error: Mutex<Option<String>>,
    calls: Mutex<Vec<SentCall>>,
}

#[allow(dead_code)]
impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_with(self, envelope: Value) -> Self {
        self.send_responses.lock().unwrap().push_back(Ok(envelope));
        self
    }

    pub fn fail_send_with(self, message: &str) -> Self {
        self.send_responses
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
        self
    }

    pub fn history(self, history: HistoryResponse) -> Self {
        *self.history.lock().unwrap() = Some(Ok(history));
        self
    }

    pub fn fail_history_with(self, message: &str) -> Self {
        *self.history.lock().unwrap() = Some(Err(message.to_string()));
        self
    }

    pub fn fail_clear_with(self, message: &str) -> Self {
        *self.clear_error.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn sent_calls(&self) -> Vec<SentCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
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
