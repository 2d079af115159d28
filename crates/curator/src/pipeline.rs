//! Curation pipeline - orchestrates the fetch-classify-merge-persist flow.

use std::collections::HashSet;
use std::path::PathBuf;

use textcat::LabelGenerator;
use tracing::info;

use crate::config::DEFAULT_BATCH_SIZE;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::labels::LabelRegistry;
use crate::prompt::Prompter;
use crate::session::ClassificationSession;
use crate::slack::{fetch_batch, resolve_channel, ChatApi};
use crate::store::DatasetFile;
use crate::ui;

/// Configuration for a curation run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Channel name, with or without `#`.
    pub channel: String,
    /// Dataset file to load and write.
    pub data_file: PathBuf,
    /// Messages fetched per batch.
    pub batch_size: usize,
    /// Users whose messages are never classified.
    pub ignored_user_ids: HashSet<String>,
    /// Whether an existing data file may be extended.
    pub allow_append: bool,
    /// Cursor to start from instead of the persisted one.
    pub latest_timestamp: Option<String>,
}

impl PipelineConfig {
    #[must_use]
    pub fn new(channel: impl Into<String>, data_file: impl Into<PathBuf>) -> Self {
        Self {
            channel: channel.into(),
            data_file: data_file.into(),
            batch_size: DEFAULT_BATCH_SIZE,
            ignored_user_ids: HashSet::new(),
            allow_append: true,
            latest_timestamp: None,
        }
    }
}

/// Result of a completed curation run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub channel_id: String,
    /// Batches fetched, including a final empty one.
    pub batches: usize,
    /// Records in the dataset after the run.
    pub total_records: usize,
    /// Cursor persisted for the next run.
    pub latest_timestamp: Option<String>,
    pub snapshot: PathBuf,
}

/// Curation pipeline orchestrator.
pub struct Pipeline<'a> {
    config: PipelineConfig,
    api: &'a dyn ChatApi,
    prompter: &'a dyn Prompter,
    generator: &'a dyn LabelGenerator,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: PipelineConfig,
        api: &'a dyn ChatApi,
        prompter: &'a dyn Prompter,
        generator: &'a dyn LabelGenerator,
    ) -> Self {
        Self {
            config,
            api,
            prompter,
            generator,
        }
    }

    /// Run the pipeline until the operator stops or the channel is exhausted.
    ///
    /// The dataset is written once, at the end. An error anywhere in the run
    /// discards every decision made so far.
    pub async fn run(&self) -> Result<RunSummary> {
        // Load before any network call so a conflicting file fails fast
        let DatasetFile {
            mut data,
            latest_timestamp,
        } = DatasetFile::load(&self.config.data_file, self.config.allow_append)?;
        let cursor = self.config.latest_timestamp.clone().or(latest_timestamp);

        let channel_id = resolve_channel(self.api, &self.config.channel).await?;

        info!(
            channel = %self.config.channel,
            channel_id = %channel_id,
            records = data.len(),
            cursor = cursor.as_deref().unwrap_or("<latest>"),
            batch_size = self.config.batch_size,
            "Starting curation"
        );

        let (cursor, batches) = self.classify_messages(&channel_id, &mut data, cursor).await?;

        let file = DatasetFile::new(data, cursor);
        let snapshot = file.persist(&self.config.data_file)?;
        ui::print_success(&format!(
            "Successfully wrote data to {}",
            self.config.data_file.display()
        ));

        Ok(RunSummary {
            channel_id,
            batches,
            total_records: file.data.len(),
            latest_timestamp: file.latest_timestamp,
            snapshot,
        })
    }

    /// Fetch and classify batches, merging each accepted batch into `data`.
    ///
    /// Returns the cursor to persist and the number of batches fetched. An
    /// empty batch ends the run and leaves the cursor where it was.
    async fn classify_messages(
        &self,
        channel_id: &str,
        data: &mut Dataset,
        mut cursor: Option<String>,
    ) -> Result<(Option<String>, usize)> {
        let mut registry = LabelRegistry::from_dataset(data);
        let session = ClassificationSession::new(
            self.prompter,
            self.generator,
            &self.config.ignored_user_ids,
        );
        let mut batches = 0;

        loop {
            let batch = fetch_batch(
                self.api,
                channel_id,
                cursor.as_deref(),
                self.config.batch_size,
            )
            .await?;
            batches += 1;

            if batch.is_empty() {
                ui::print_info("No older messages left in this channel");
                info!(batches, "Channel exhausted");
                break;
            }

            cursor = batch.next_cursor.clone();
            ui::print_section(&format!(
                "Retrieved new batch of {} message{} (latest timestamp is {})",
                batch.messages.len(),
                if batch.messages.len() > 1 { "s" } else { "" },
                cursor.as_deref().unwrap_or("<none>")
            ));

            let outcome = session.classify_batch(&batch.messages, data, &mut registry)?;
            outcome.merge_into(data);

            let prompt = format!(
                "{} total messages classified, continue to the next batch of messages?",
                data.len()
            );
            if !self.prompter.confirm(&prompt, true)? {
                break;
            }
        }

        Ok((cursor, batches))
    }
}
