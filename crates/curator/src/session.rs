//! Interactive classification of one batch of messages.

use std::collections::HashSet;

use textcat::LabelGenerator;
use tracing::{debug, info};

use crate::dataset::{BatchOutcome, ClassificationRecord, Dataset};
use crate::error::Result;
use crate::labels::LabelRegistry;
use crate::prompt::Prompter;
use crate::slack::Message;
use crate::ui;

const NO_TEXT: &str = "<NO TEXT>";
const REVIEW_PROMPT: &str = "Are the above entries correct?";

/// Drives the operator through labeling a batch.
pub struct ClassificationSession<'a> {
    prompter: &'a dyn Prompter,
    generator: &'a dyn LabelGenerator,
    ignored_user_ids: &'a HashSet<String>,
}

impl<'a> ClassificationSession<'a> {
    pub fn new(
        prompter: &'a dyn Prompter,
        generator: &'a dyn LabelGenerator,
        ignored_user_ids: &'a HashSet<String>,
    ) -> Self {
        Self {
            prompter,
            generator,
            ignored_user_ids,
        }
    }

    /// Label every eligible message of `messages`.
    ///
    /// The operator reviews the whole batch at the end. Rejecting it discards
    /// every decision, including labels created during the attempt, and starts
    /// the batch over from the first message. `registry` only changes when the
    /// batch is accepted. `dataset` is never modified.
    pub fn classify_batch(
        &self,
        messages: &[Message],
        dataset: &Dataset,
        registry: &mut LabelRegistry,
    ) -> Result<BatchOutcome> {
        let mut attempt = 1_u32;
        loop {
            let mut labels = registry.clone();
            let outcome = self.classify_attempt(messages, dataset, &mut labels)?;

            ui::print_batch_summary(&outcome);
            if self.prompter.confirm(REVIEW_PROMPT, true)? {
                info!(
                    attempt,
                    added = outcome.added.len(),
                    updated = outcome.updated.len(),
                    "Batch accepted"
                );
                *registry = labels;
                return Ok(outcome);
            }

            info!(attempt, "Batch rejected, classifying again");
            attempt += 1;
        }
    }

    fn classify_attempt(
        &self,
        messages: &[Message],
        dataset: &Dataset,
        registry: &mut LabelRegistry,
    ) -> Result<BatchOutcome> {
        let mut outcome = BatchOutcome::default();

        for (index, message) in messages.iter().enumerate() {
            ui::print_message_progress(index, messages.len(), message.plain_text().unwrap_or(NO_TEXT));

            let Some(text) = message.plain_text().filter(|_| !message.has_rich_content()) else {
                ui::print_skip("Message has no text or attachments/blocks, skipping");
                continue;
            };

            if let Some(user) = message
                .user
                .as_deref()
                .filter(|user| self.ignored_user_ids.contains(*user))
            {
                ui::print_skip(&format!(
                    "Message is from an ignored user ID ({user}), skipping"
                ));
                continue;
            }

            let key = message.identity_key();
            let existing = dataset.get(&key);

            if let Some(record) = existing {
                let drifted = record.text != text;
                let prompt = format!(
                    "There is already an existing classification for this message{}, do you want to change it from {}?",
                    if drifted { " (text has been modified)" } else { "" },
                    record.label
                );
                if !self.prompter.confirm(&prompt, false)? {
                    debug!(key = %key, "Keeping existing classification");
                    continue;
                }
            }

            let suggestion = self.generator.generate_label(text);
            let label = registry.choose_label(self.prompter, suggestion.as_deref())?;
            let record = ClassificationRecord::new(text, label);

            if existing.is_some() {
                outcome.updated.insert(key, record);
            } else {
                outcome.added.insert(key, record);
            }
        }

        Ok(outcome)
    }
}
