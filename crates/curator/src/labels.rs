//! Label registry.
//!
//! Labels are discovered from the dataset itself; the ignore label is always
//! offered but never counted as a known label. New labels created while
//! curating are added to the registry for the rest of the session.

use std::collections::BTreeSet;

use tracing::debug;

use crate::dataset::{Dataset, IGNORE_LABEL};
use crate::error::Result;
use crate::prompt::Prompter;
use crate::ui;

/// Choice that opens the new-label prompt.
pub const CREATE_LABEL: &str = "+add new";

/// Answer to the new-label prompt that returns to the label list.
pub const CANCEL_LABEL: &str = "CANCEL";

const CHOOSE_PROMPT: &str = "Please choose a label to apply to this message";
const CREATE_PROMPT: &str = "New label name (enter CANCEL to select an existing label)";

/// Set of labels known for a dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelRegistry {
    known: BTreeSet<String>,
}

impl LabelRegistry {
    /// Discover labels from existing records, excluding the ignore label.
    #[must_use]
    pub fn from_dataset(dataset: &Dataset) -> Self {
        Self {
            known: dataset
                .values()
                .filter(|record| !record.is_ignored())
                .map(|record| record.label.clone())
                .collect(),
        }
    }

    /// Known labels, sorted.
    #[must_use]
    pub fn known(&self) -> &BTreeSet<String> {
        &self.known
    }

    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.known.contains(label)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.known.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    /// Items of the label prompt: ignore, known labels, then create.
    #[must_use]
    pub fn choices(&self) -> Vec<String> {
        std::iter::once(IGNORE_LABEL.to_string())
            .chain(self.known.iter().cloned())
            .chain(std::iter::once(CREATE_LABEL.to_string()))
            .collect()
    }

    /// Whether `name` may be created as a new label.
    #[must_use]
    pub fn is_valid_new_label(&self, name: &str) -> bool {
        !name.is_empty() && name != CREATE_LABEL && name != IGNORE_LABEL && !self.contains(name)
    }

    /// Ask the operator for a label.
    ///
    /// `suggestion` preselects a label when it is one of the choices.
    /// Choosing [`CREATE_LABEL`] prompts for a new name; a cancelled creation
    /// returns to the label list.
    pub fn choose_label(
        &mut self,
        prompter: &dyn Prompter,
        suggestion: Option<&str>,
    ) -> Result<String> {
        loop {
            let choices = self.choices();
            let default = suggestion
                .and_then(|label| choices.iter().position(|c| c == label && c != CREATE_LABEL))
                .unwrap_or(0);
            let index = prompter.select(CHOOSE_PROMPT, &choices, default)?;
            let label = choices[index].clone();

            if label != CREATE_LABEL {
                return Ok(label);
            }

            if let Some(created) = self.create_label(prompter)? {
                debug!(label = %created, "Created label");
                self.known.insert(created.clone());
                return Ok(created);
            }
        }
    }

    /// Prompt for a new label name until a valid one is given.
    ///
    /// Returns `None` when the operator cancels.
    fn create_label(&self, prompter: &dyn Prompter) -> Result<Option<String>> {
        loop {
            let name = prompter.input(CREATE_PROMPT)?;
            if name == CANCEL_LABEL {
                return Ok(None);
            }
            if self.is_valid_new_label(&name) {
                return Ok(Some(name));
            }
            ui::print_warning(&format!(
                "Error: new label \"{name}\" is invalid, it may already exist or be reserved, please try again"
            ));
        }
    }
}
