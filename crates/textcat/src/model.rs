//! Multinomial naive-Bayes text categorizer.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{TextcatError, TextcatResult};

/// File name of the serialized model inside a model directory.
pub const MODEL_FILE: &str = "model.json";

/// A single training example: the text and its per-label targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub text: String,
    /// Map of label to whether it applies to `text`.
    pub cats: BTreeMap<String, bool>,
}

impl Example {
    #[must_use]
    pub fn new(text: impl Into<String>, cats: BTreeMap<String, bool>) -> Self {
        Self {
            text: text.into(),
            cats,
        }
    }

    /// The first label marked as applying to this example.
    #[must_use]
    pub fn true_label(&self) -> Option<&str> {
        self.cats
            .iter()
            .find(|(_, applies)| **applies)
            .map(|(label, _)| label.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct LabelStats {
    documents: u64,
    tokens: u64,
    counts: BTreeMap<String, u64>,
}

/// Trained model. Scores are normalized probabilities over all labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    labels: BTreeMap<String, LabelStats>,
    vocabulary: BTreeSet<String>,
    documents: u64,
}

impl Model {
    /// Train a model over `labels` from `examples`.
    ///
    /// Examples whose true label is not one of `labels` are skipped.
    pub fn train<'a, I>(labels: &BTreeSet<String>, examples: I) -> TextcatResult<Self>
    where
        I: IntoIterator<Item = &'a Example>,
    {
        if labels.is_empty() {
            return Err(TextcatError::NoLabels);
        }

        let mut model = Self {
            labels: labels
                .iter()
                .map(|label| (label.clone(), LabelStats::default()))
                .collect(),
            vocabulary: BTreeSet::new(),
            documents: 0,
        };

        for example in examples {
            let Some(stats) = example
                .true_label()
                .and_then(|label| model.labels.get_mut(label))
            else {
                debug!(text = %example.text, "Skipping example without a known label");
                continue;
            };

            stats.documents += 1;
            for token in tokenize(&example.text) {
                stats.tokens += 1;
                *stats.counts.entry(token.clone()).or_insert(0) += 1;
                model.vocabulary.insert(token);
            }
            model.documents += 1;
        }

        if model.documents == 0 {
            return Err(TextcatError::EmptyTrainingSet);
        }

        debug!(
            labels = model.labels.len(),
            documents = model.documents,
            vocabulary = model.vocabulary.len(),
            "Trained model"
        );
        Ok(model)
    }

    /// Labels known to the model, sorted.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.keys().map(String::as_str)
    }

    /// Number of documents the model was trained on.
    #[must_use]
    pub fn documents(&self) -> u64 {
        self.documents
    }

    /// Probability of each label for `text`.
    #[must_use]
    pub fn scores(&self, text: &str) -> BTreeMap<String, f64> {
        let tokens: Vec<String> = tokenize(text)
            .into_iter()
            .filter(|token| self.vocabulary.contains(token))
            .collect();
        let vocabulary = self.vocabulary.len() as f64;
        let label_count = self.labels.len() as f64;

        let log_scores: Vec<(&String, f64)> = self
            .labels
            .iter()
            .map(|(label, stats)| {
                let prior =
                    ((stats.documents as f64 + 1.0) / (self.documents as f64 + label_count)).ln();
                let likelihood: f64 = tokens
                    .iter()
                    .map(|token| {
                        let count = stats.counts.get(token).copied().unwrap_or(0) as f64;
                        ((count + 1.0) / (stats.tokens as f64 + vocabulary)).ln()
                    })
                    .sum();
                (label, prior + likelihood)
            })
            .collect();

        let max = log_scores
            .iter()
            .map(|(_, score)| *score)
            .fold(f64::NEG_INFINITY, f64::max);
        let total: f64 = log_scores
            .iter()
            .map(|(_, score)| (score - max).exp())
            .sum();

        log_scores
            .into_iter()
            .map(|(label, score)| (label.clone(), (score - max).exp() / total))
            .collect()
    }

    /// Best-scoring label for `text` with its probability.
    #[must_use]
    pub fn predict(&self, text: &str) -> Option<(String, f64)> {
        let mut best: Option<(String, f64)> = None;
        for (label, score) in self.scores(text) {
            if best.as_ref().is_none_or(|(_, top)| score > *top) {
                best = Some((label, score));
            }
        }
        best
    }

    /// Fraction of `examples` whose true label is predicted, if any are labeled.
    #[must_use]
    pub fn accuracy(&self, examples: &[Example]) -> Option<f64> {
        let mut total = 0_u32;
        let mut correct = 0_u32;
        for example in examples {
            let Some(expected) = example.true_label() else {
                continue;
            };
            total += 1;
            if self
                .predict(&example.text)
                .is_some_and(|(label, _)| label == expected)
            {
                correct += 1;
            }
        }
        (total > 0).then(|| f64::from(correct) / f64::from(total))
    }

    /// Whether `dir` contains a saved model.
    #[must_use]
    pub fn exists(dir: &Path) -> bool {
        dir.join(MODEL_FILE).is_file()
    }

    /// Write the model into `dir`, creating it if needed.
    pub fn save(&self, dir: &Path) -> TextcatResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(MODEL_FILE);
        std::fs::write(&path, serde_json::to_string(self)?)?;
        Ok(path)
    }

    /// Load a model previously written with [`Model::save`].
    pub fn load(dir: &Path) -> TextcatResult<Self> {
        let path = dir.join(MODEL_FILE);
        if !path.is_file() {
            return Err(TextcatError::ModelNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Lowercased alphanumeric tokens of `text`.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}
