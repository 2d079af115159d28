//! Curates Slack channel messages into a labeled text classification dataset.
//!
//! This crate provides:
//! - Channel resolution and cursor-based message retrieval over the Slack Web API
//! - An interactive labeling session with whole-batch review
//! - A JSON dataset store with timestamped snapshots
//! - Training and verification of a text categorizer from the curated data
//!
//! # Flow
//!
//! The [`Pipeline`] loads the dataset, resolves the channel once, then
//! repeatedly fetches an older batch, lets the operator label it through a
//! [`ClassificationSession`], merges the accepted batch and asks whether to
//! continue. The dataset is written once when the run ends.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod dataset;
pub mod error;
pub mod labels;
pub mod pipeline;
pub mod prompt;
pub mod session;
pub mod slack;
pub mod store;
pub mod training;
pub mod ui;

// Re-export main types
pub use dataset::{BatchOutcome, ClassificationRecord, Dataset, IGNORE_LABEL};
pub use error::{CuratorError, Result};
pub use labels::LabelRegistry;
pub use pipeline::{Pipeline, PipelineConfig, RunSummary};
pub use prompt::{Answer, DialoguerPrompter, Prompter, ScriptedPrompter};
pub use session::ClassificationSession;
pub use slack::{Batch, ChatApi, Message, SlackClient};
pub use store::DatasetFile;
