//! Slack Web API client.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::types::{
    ChannelPage, ConversationsHistoryResponse, ConversationsListResponse, Envelope, Message,
};
use super::ChatApi;
use crate::config::{validate_user_token, DEFAULT_SLACK_API_URL};
use crate::error::{CuratorError, Result};

/// Channel types searched when resolving a channel name.
const CHANNEL_TYPES: &str = "public_channel,private_channel";

/// Slack Web API client authenticated with a user token.
pub struct SlackClient {
    token: String,
    base_url: String,
    client: reqwest::Client,
}

impl SlackClient {
    /// Create a client for the public Slack API.
    ///
    /// Fails with [`CuratorError::Auth`] unless `token` is a user token.
    pub fn new(token: Option<&str>) -> Result<Self> {
        Self::with_base_url(token, DEFAULT_SLACK_API_URL)
    }

    /// Create a client against a specific API base URL.
    pub fn with_base_url(token: Option<&str>, base_url: &str) -> Result<Self> {
        let token = validate_user_token(token)?;
        Ok(Self {
            token: token.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        })
    }

    /// Call a Web API method and decode its body.
    async fn call<T: DeserializeOwned>(&self, method: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}/{method}", self.base_url);
        debug!(method, "Calling Slack API");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await?
            .error_for_status()?;

        let body: serde_json::Value = response.json().await?;
        let envelope: Envelope = serde_json::from_value(body.clone())?;
        if !envelope.ok {
            let error = envelope.error.unwrap_or_else(|| "unknown_error".to_string());
            warn!(method, error = %error, "Slack API returned an error");
            return Err(CuratorError::SlackApi {
                method: method.to_string(),
                error,
            });
        }

        Ok(serde_json::from_value(body)?)
    }
}

#[async_trait]
impl ChatApi for SlackClient {
    async fn list_channels(&self, cursor: Option<&str>) -> Result<ChannelPage> {
        let mut query = vec![("types", CHANNEL_TYPES.to_string())];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }

        let response: ConversationsListResponse = self.call("conversations.list", &query).await?;
        Ok(ChannelPage {
            channels: response.channels,
            next_cursor: response
                .response_metadata
                .next_cursor
                .filter(|cursor| !cursor.is_empty()),
        })
    }

    async fn history(
        &self,
        channel_id: &str,
        latest: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Message>> {
        let mut query = vec![
            ("channel", channel_id.to_string()),
            ("limit", limit.to_string()),
        ];
        if let Some(latest) = latest {
            query.push(("latest", latest.to_string()));
        }

        let response: ConversationsHistoryResponse =
            self.call("conversations.history", &query).await?;
        Ok(response.messages)
    }
}
