//! Text categorizer for labeled chat datasets.
//!
//! This crate provides the training and verification backend used by the
//! curator CLI:
//!
//! - [`train_textcat_model`] trains a [`Model`] from `(text, cats)` examples
//!   and writes it to an output directory
//! - [`test_textcat_model`] loads a saved model and checks its prediction
//!   against an expected label
//! - [`LabelGenerator`] suggests labels while curating, with a null-object
//!   variant when no model is available

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod generator;
pub mod model;

pub use error::{TextcatError, TextcatResult};
pub use generator::{label_generator, LabelGenerator, ModelLabelGenerator, NullLabelGenerator};
pub use model::{tokenize, Example, Model, MODEL_FILE};

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use tracing::info;

/// Outcome of a training run.
#[derive(Debug, Clone)]
pub struct TrainReport {
    /// Where the model was written.
    pub model_path: PathBuf,
    pub train_examples: usize,
    pub holdout_examples: usize,
    /// Holdout accuracy, when the holdout set has labeled examples.
    pub holdout_accuracy: Option<f64>,
    /// Scores for the smoke-test text, if one was given.
    pub smoke_test: Option<BTreeMap<String, f64>>,
}

/// Outcome of checking one text against an expected label.
#[derive(Debug, Clone, PartialEq)]
pub struct Verification {
    pub text: String,
    pub expected_label: String,
    pub predicted_label: Option<String>,
    pub scores: BTreeMap<String, f64>,
}

impl Verification {
    /// True when the best-scoring label is the expected one.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.predicted_label.as_deref() == Some(self.expected_label.as_str())
    }
}

/// Train a model and save it to `output_dir`.
///
/// `load_data` produces the `(train, holdout)` example sets.
pub fn train_textcat_model<F>(
    load_data: F,
    output_dir: &Path,
    labels: &BTreeSet<String>,
    test_text: Option<&str>,
) -> TextcatResult<TrainReport>
where
    F: FnOnce() -> (Vec<Example>, Vec<Example>),
{
    let (train, holdout) = load_data();
    info!(
        train = train.len(),
        holdout = holdout.len(),
        labels = labels.len(),
        "Training text categorizer"
    );

    let model = Model::train(labels, &train)?;
    let holdout_accuracy = model.accuracy(&holdout);
    if let Some(accuracy) = holdout_accuracy {
        info!(accuracy, "Holdout evaluation complete");
    }

    let model_path = model.save(output_dir)?;
    info!(path = %model_path.display(), "Saved model");

    Ok(TrainReport {
        model_path,
        train_examples: train.len(),
        holdout_examples: holdout.len(),
        holdout_accuracy,
        smoke_test: test_text.map(|text| model.scores(text)),
    })
}

/// Load the model in `model_dir` and verify its prediction for `text`.
pub fn test_textcat_model(
    model_dir: &Path,
    text: &str,
    expected_label: &str,
) -> TextcatResult<Verification> {
    let model = Model::load(model_dir)?;
    let scores = model.scores(text);
    let predicted_label = model.predict(text).map(|(label, _)| label);

    Ok(Verification {
        text: text.to_string(),
        expected_label: expected_label.to_string(),
        predicted_label,
        scores,
    })
}
