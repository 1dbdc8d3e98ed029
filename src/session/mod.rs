//! Session module for Concierge
//!
//! This module contains the chat session core: the message model, the
//! ordered timeline with its observer seam, the session identity tracker,
//! and the engine that orchestrates prompt submission and history loading.

pub mod engine;
pub mod message;
pub mod timeline;
pub mod tracker;

pub use engine::ChatEngine;
pub use message::{ChatMessage, Role, TYPING_MESSAGE_ID};
pub use timeline::{Timeline, TimelineEvent, TimelineObserver};
pub use tracker::SessionTracker;
