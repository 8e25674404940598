//! Message source boundary
//!
//! The sync engine pulls channel history through this interface and calls
//! nothing else on the remote side. Implementations must deliver messages
//! newest-first; the engine owns the cutoff and the seen-set bookkeeping.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub mod http;

pub use http::HttpMessageSource;

/// One raw message as delivered by the channel feed.
#[derive(Debug, Clone)]
pub struct ChannelMessage {
    /// Stable per-channel sequence identifier.
    pub id: i64,
    /// Message body; may be empty (media-only posts).
    pub text: String,
    /// Delivery timestamp.
    pub date: DateTime<Utc>,
}

/// One page of reverse-chronological history.
#[derive(Debug, Clone)]
pub struct MessagePage {
    pub messages: Vec<ChannelMessage>,
    /// Cursor for the page after this one; opaque to the engine.
    pub next_cursor: Option<i64>,
    pub has_more: bool,
}

/// Source-side failures. Any of these aborts the current sync pass; the
/// engine never applies its deletion step on a partial iteration.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    #[error("channel not found: {handle}")]
    ChannelNotFound { handle: String },
    #[error("network error: {details}")]
    Network { details: String, retryable: bool },
    #[error("malformed feed response: {details}")]
    Malformed { details: String },
}

/// A channel feed that can be paged backwards through time.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Resolve a human-readable handle to the stable numeric channel
    /// identity used as the persistence key component.
    async fn resolve_channel(&self, handle: &str) -> Result<i64, SourceError>;

    /// Fetch the next page of messages, newest first. `cursor` is the
    /// `next_cursor` of the previous page, or `None` for the first page.
    async fn fetch_page(
        &self,
        channel_id: i64,
        cursor: Option<i64>,
        limit: usize,
    ) -> Result<MessagePage, SourceError>;
}
