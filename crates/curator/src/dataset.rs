//! Labeled dataset types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The label a message receives when it should be left out of training.
pub const IGNORE_LABEL: &str = "ignore";

/// A labeled message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    /// Message text as last seen.
    pub text: String,
    pub label: String,
}

impl ClassificationRecord {
    #[must_use]
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
        }
    }

    /// Whether the record is excluded from training.
    #[must_use]
    pub fn is_ignored(&self) -> bool {
        self.label == IGNORE_LABEL
    }
}

/// Records keyed by message identity key (`"{ts}-{user}"`).
pub type Dataset = BTreeMap<String, ClassificationRecord>;

/// Records produced by classifying one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Records for identity keys not yet in the dataset.
    pub added: Dataset,
    /// Relabeled records for identity keys already in the dataset.
    pub updated: Dataset,
}

impl BatchOutcome {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty()
    }

    /// Fold the batch into `dataset`, overwriting updated keys.
    pub fn merge_into(self, dataset: &mut Dataset) {
        dataset.extend(self.added);
        dataset.extend(self.updated);
    }
}
