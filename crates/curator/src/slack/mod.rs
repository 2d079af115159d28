//! Slack channel access: channel resolution and batch retrieval.

mod client;
mod types;

pub use client::SlackClient;
pub use types::{Channel, ChannelPage, Message};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{CuratorError, Result};

/// Paginated chat API used by the curation pipeline.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// One page of visible public and private channels.
    async fn list_channels(&self, cursor: Option<&str>) -> Result<ChannelPage>;

    /// Up to `limit` messages strictly older than `latest`, newest first.
    async fn history(
        &self,
        channel_id: &str,
        latest: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Message>>;
}

/// Resolve a channel name (with or without `#`) to its ID.
pub async fn resolve_channel(api: &dyn ChatApi, name: &str) -> Result<String> {
    let name = name.strip_prefix('#').unwrap_or(name);
    let mut cursor: Option<String> = None;
    let mut pages = 0_usize;

    loop {
        let page = api.list_channels(cursor.as_deref()).await?;
        pages += 1;

        if let Some(channel) = page.channels.iter().find(|c| c.name == name) {
            info!(channel = %name, channel_id = %channel.id, pages, "Resolved channel");
            return Ok(channel.id.clone());
        }

        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    debug!(channel = %name, pages, "Channel not found");
    Err(CuratorError::NotFound {
        name: name.to_string(),
    })
}

/// One page of messages and the cursor for the next, older page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    /// Messages, newest first.
    pub messages: Vec<Message>,
    /// Timestamp of the oldest message; `None` when the batch is empty.
    pub next_cursor: Option<String>,
}

impl Batch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Fetch up to `batch_size` messages older than `before`.
pub async fn fetch_batch(
    api: &dyn ChatApi,
    channel_id: &str,
    before: Option<&str>,
    batch_size: usize,
) -> Result<Batch> {
    let messages = api.history(channel_id, before, batch_size).await?;
    let next_cursor = messages.last().map(|message| message.ts.clone());
    debug!(
        channel_id,
        before = before.unwrap_or("<latest>"),
        count = messages.len(),
        next_cursor = next_cursor.as_deref().unwrap_or("<none>"),
        "Fetched batch"
    );
    Ok(Batch {
        messages,
        next_cursor,
    })
}
