//! Label suggestion capability.
//!
//! A [`LabelGenerator`] is chosen once at startup: if a trained model is
//! available the [`ModelLabelGenerator`] is used, otherwise the
//! [`NullLabelGenerator`] stands in and never suggests anything.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::model::Model;

/// Suggests a label for a piece of message text.
pub trait LabelGenerator {
    /// Suggested label for `text`, if any.
    fn generate_label(&self, text: &str) -> Option<String>;

    /// Whether a real backend is behind this generator.
    fn is_backend_present(&self) -> bool;
}

/// Generator backed by a trained [`Model`].
#[derive(Debug, Clone)]
pub struct ModelLabelGenerator {
    model: Model,
}

impl ModelLabelGenerator {
    #[must_use]
    pub fn new(model: Model) -> Self {
        Self { model }
    }
}

impl LabelGenerator for ModelLabelGenerator {
    fn generate_label(&self, text: &str) -> Option<String> {
        self.model.predict(text).map(|(label, score)| {
            debug!(label = %label, score, "Generated label suggestion");
            label
        })
    }

    fn is_backend_present(&self) -> bool {
        true
    }
}

/// Generator used when no model is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLabelGenerator;

impl LabelGenerator for NullLabelGenerator {
    fn generate_label(&self, _text: &str) -> Option<String> {
        None
    }

    fn is_backend_present(&self) -> bool {
        false
    }
}

/// Select the label generator for `model_dir`.
///
/// Falls back to [`NullLabelGenerator`] when no directory is given, no model
/// exists in it, or the model cannot be read.
#[must_use]
pub fn label_generator(model_dir: Option<&Path>) -> Box<dyn LabelGenerator> {
    let Some(dir) = model_dir else {
        debug!("No model directory configured, label suggestions disabled");
        return Box::new(NullLabelGenerator);
    };

    if !Model::exists(dir) {
        debug!(dir = %dir.display(), "No trained model found, label suggestions disabled");
        return Box::new(NullLabelGenerator);
    }

    match Model::load(dir) {
        Ok(model) => {
            info!(dir = %dir.display(), "Label suggestions enabled");
            Box::new(ModelLabelGenerator::new(model))
        }
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "Failed to load model, label suggestions disabled");
            Box::new(NullLabelGenerator)
        }
    }
}
