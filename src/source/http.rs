//! HTTP feed gateway client.
//!
//! Talks to the message-feed gateway that fronts the actual messaging
//! network. Two endpoints: channel resolution and backwards message paging.
//! Retry policy lives with the scheduler that re-runs sync passes, not here;
//! this client only classifies failures as retryable or not.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use super::{ChannelMessage, MessagePage, MessageSource, SourceError};

#[derive(Debug, Clone)]
pub struct HttpMessageSource {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ChannelInfo {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    id: i64,
    #[serde(default)]
    text: Option<String>,
    date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    messages: Vec<WireMessage>,
    #[serde(default)]
    has_more: bool,
}

impl HttpMessageSource {
    pub fn new(base_url: impl Into<String>) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SourceError::Network {
                details: format!("failed to build HTTP client: {e}"),
                retryable: false,
            })?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<T, SourceError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::Network {
                details: e.to_string(),
                retryable: e.is_timeout() || e.is_connect(),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::ChannelNotFound {
                handle: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(SourceError::Network {
                details: format!("gateway returned status {status}"),
                retryable: status.is_server_error()
                    || status == reqwest::StatusCode::TOO_MANY_REQUESTS,
            });
        }

        response.json::<T>().await.map_err(|e| SourceError::Malformed {
            details: e.to_string(),
        })
    }
}

#[async_trait]
impl MessageSource for HttpMessageSource {
    async fn resolve_channel(&self, handle: &str) -> Result<i64, SourceError> {
        let url = format!("{}/channels/{}", self.base_url, handle);
        let info: ChannelInfo = self.get_json(&url).await.map_err(|e| match e {
            SourceError::ChannelNotFound { .. } => SourceError::ChannelNotFound {
                handle: handle.to_string(),
            },
            other => other,
        })?;
        debug!(handle, channel_id = info.id, "resolved channel");
        Ok(info.id)
    }

    async fn fetch_page(
        &self,
        channel_id: i64,
        cursor: Option<i64>,
        limit: usize,
    ) -> Result<MessagePage, SourceError> {
        let mut url = format!(
            "{}/channels/{}/messages?limit={}",
            self.base_url, channel_id, limit
        );
        if let Some(before_id) = cursor {
            url.push_str(&format!("&before_id={before_id}"));
        }

        let body: MessagesResponse = self.get_json(&url).await?;
        let next_cursor = body.messages.last().map(|m| m.id);
        let messages = body
            .messages
            .into_iter()
            .map(|m| ChannelMessage {
                id: m.id,
                text: m.text.unwrap_or_default(),
                date: m.date,
            })
            .collect();

        Ok(MessagePage {
            messages,
            next_cursor,
            has_more: body.has_more,
        })
    }
}
