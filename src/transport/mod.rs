//! Transport module for Concierge
//!
//! This module contains the external collaborator seam: the
//! [`ChatTransport`] trait every backend transport must implement, and the
//! batteries-included HTTP implementation.

pub mod base;
pub mod http;

pub use base::{ChatTransport, HistoryResponse};
pub use http::HttpChatTransport;
