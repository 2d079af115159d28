//! Slack Web API types.

use serde::{Deserialize, Serialize};

/// A channel message from `conversations.history`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message timestamp; also its ordering key.
    pub ts: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocks: Option<Vec<serde_json::Value>>,
}

impl Message {
    /// Create a plain-text message.
    #[must_use]
    pub fn new(ts: impl Into<String>, user: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            ts: ts.into(),
            text: Some(text.into()),
            user: Some(user.into()),
            ..Self::default()
        }
    }

    /// Dataset key for this message, stable across runs.
    #[must_use]
    pub fn identity_key(&self) -> String {
        format!("{}-{}", self.ts, self.user.as_deref().unwrap_or("None"))
    }

    /// Non-empty message text.
    #[must_use]
    pub fn plain_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|text| !text.is_empty())
    }

    /// Whether the message carries attachments or blocks.
    #[must_use]
    pub fn has_rich_content(&self) -> bool {
        let present = |items: &Option<Vec<serde_json::Value>>| {
            items.as_ref().is_some_and(|items| !items.is_empty())
        };
        present(&self.attachments) || present(&self.blocks)
    }
}

/// A channel from `conversations.list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
}

/// One page of `conversations.list`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelPage {
    pub channels: Vec<Channel>,
    /// Cursor for the next page; `None` on the last page.
    pub next_cursor: Option<String>,
}

/// Common envelope of every Web API response.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ResponseMetadata {
    #[serde(default)]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConversationsListResponse {
    #[serde(default)]
    pub channels: Vec<Channel>,
    #[serde(default)]
    pub response_metadata: ResponseMetadata,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConversationsHistoryResponse {
    #[serde(default)]
    pub messages: Vec<Message>,
}
