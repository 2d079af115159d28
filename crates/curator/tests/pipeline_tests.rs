//! End-to-end tests of the curation pipeline.
//!
//! These tests drive the full load-fetch-classify-merge-persist flow against
//! an in-memory channel and a scripted operator.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use curator::labels::CREATE_LABEL;
use curator::slack::{Channel, ChannelPage};
use curator::{
    Answer, ChatApi, ClassificationRecord, CuratorError, Dataset, DatasetFile, Message, Pipeline,
    PipelineConfig, Result, ScriptedPrompter,
};
use tempfile::TempDir;
use textcat::NullLabelGenerator;

// =============================================================================
// In-memory channel
// =============================================================================

/// A single channel whose history is served newest first.
struct FakeChannel {
    channel: Channel,
    messages: Vec<Message>,
    calls: AtomicUsize,
}

impl FakeChannel {
    fn new(messages: Vec<Message>) -> Self {
        Self {
            channel: Channel {
                id: "C42".to_string(),
                name: "oncall".to_string(),
            },
            messages,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatApi for FakeChannel {
    async fn list_channels(&self, _cursor: Option<&str>) -> Result<ChannelPage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ChannelPage {
            channels: vec![self.channel.clone()],
            next_cursor: None,
        })
    }

    async fn history(
        &self,
        channel_id: &str,
        latest: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Message>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(channel_id, self.channel.id);
        let latest: Option<f64> = latest.map(|l| l.parse().unwrap());
        Ok(self
            .messages
            .iter()
            .filter(|m| latest.is_none_or(|latest| m.ts.parse::<f64>().unwrap() < latest))
            .take(limit)
            .cloned()
            .collect())
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn config(data_file: &Path) -> PipelineConfig {
    PipelineConfig::new("#oncall", data_file)
}

async fn run(
    api: &FakeChannel,
    prompter: &ScriptedPrompter,
    config: PipelineConfig,
) -> Result<curator::RunSummary> {
    Pipeline::new(config, api, prompter, &NullLabelGenerator)
        .run()
        .await
}

fn data_file(dir: &TempDir) -> PathBuf {
    dir.path().join("slack_channel_data/latest.json")
}

fn dataset_json(path: &Path) -> String {
    let file = DatasetFile::load(path, true).unwrap();
    serde_json::to_string_pretty(&file.data).unwrap()
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_first_label_written_to_empty_file() {
    let dir = TempDir::new().unwrap();
    let path = data_file(&dir);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, r#"{"data": {}, "latest_timestamp": null}"#).unwrap();

    let loaded = DatasetFile::load(&path, true).unwrap();
    assert!(loaded.data.is_empty());
    assert!(loaded.latest_timestamp.is_none());

    let api = FakeChannel::new(vec![Message::new("100", "U1", "hi")]);
    let prompter = ScriptedPrompter::new([
        Answer::select(CREATE_LABEL),
        Answer::input("greeting"),
        Answer::Confirm(true),
        Answer::Confirm(false),
    ]);

    let summary = run(&api, &prompter, config(&path)).await.unwrap();
    assert_eq!(summary.channel_id, "C42");
    assert_eq!(summary.total_records, 1);
    assert!(summary.snapshot.exists());
    assert_eq!(prompter.remaining(), 0);

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(
        value["data"],
        serde_json::json!({"100-U1": {"text": "hi", "label": "greeting"}})
    );
    assert_eq!(value["latest_timestamp"], "100");
}

#[tokio::test]
async fn test_declined_relabel_leaves_dataset_unchanged() {
    let dir = TempDir::new().unwrap();
    let path = data_file(&dir);
    let existing = Dataset::from([(
        "100-U1".to_string(),
        ClassificationRecord::new("hi", "greeting"),
    )]);
    DatasetFile::new(existing, None).persist(&path).unwrap();
    let before = dataset_json(&path);

    let api = FakeChannel::new(vec![Message::new("100", "U1", "hi")]);
    let prompter = ScriptedPrompter::new([
        Answer::Confirm(false),
        Answer::Confirm(true),
        Answer::Confirm(false),
    ]);

    run(&api, &prompter, config(&path)).await.unwrap();
    assert_eq!(dataset_json(&path), before);
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = data_file(&dir);
    let messages = vec![
        Message::new("3", "U1", "deploy is stuck"),
        Message::new("2", "U2", "morning!"),
        Message::new("1", "U1", "pager fired for db"),
    ];
    let api = FakeChannel::new(messages);

    let first = ScriptedPrompter::new([
        Answer::select(CREATE_LABEL),
        Answer::input("outage"),
        Answer::select("ignore"),
        Answer::select("outage"),
        Answer::Confirm(true),
        Answer::Confirm(false),
    ]);
    run(&api, &first, config(&path)).await.unwrap();
    let after_first = dataset_json(&path);

    // Restart from the top of the channel and decline every relabel
    let second = ScriptedPrompter::new([
        Answer::Confirm(false),
        Answer::Confirm(false),
        Answer::Confirm(false),
        Answer::Confirm(true),
        Answer::Confirm(false),
    ]);
    let mut config = config(&path);
    config.latest_timestamp = Some("4".to_string());
    run(&api, &second, config).await.unwrap();

    assert_eq!(dataset_json(&path), after_first);
    assert_eq!(second.remaining(), 0);
}

#[tokio::test]
async fn test_no_overwrite_conflicts_before_network() {
    let dir = TempDir::new().unwrap();
    let path = data_file(&dir);
    DatasetFile::default().persist(&path).unwrap();

    let api = FakeChannel::new(vec![Message::new("100", "U1", "hi")]);
    let prompter = ScriptedPrompter::new([]);
    let mut config = config(&path);
    config.allow_append = false;

    let err = run(&api, &prompter, config).await.unwrap_err();
    assert!(matches!(err, CuratorError::Conflict { .. }));
    assert_eq!(api.calls(), 0);
    assert!(prompter.asked().is_empty());
}

#[tokio::test]
async fn test_unknown_channel_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let path = data_file(&dir);

    let api = FakeChannel::new(Vec::new());
    let prompter = ScriptedPrompter::new([]);
    let mut config = config(&path);
    config.channel = "#nowhere".to_string();

    let err = run(&api, &prompter, config).await.unwrap_err();
    assert!(matches!(err, CuratorError::NotFound { ref name } if name == "nowhere"));
    assert!(!path.exists());
}

#[tokio::test]
async fn test_ineligible_and_ignored_messages_never_recorded() {
    let dir = TempDir::new().unwrap();
    let path = data_file(&dir);

    let with_blocks = Message {
        blocks: Some(vec![serde_json::json!({"type": "section"})]),
        ..Message::new("4", "U1", "a block message")
    };
    let api = FakeChannel::new(vec![
        with_blocks,
        Message::new("3", "BOT", "build passed"),
        Message::new("2", "U1", ""),
        Message::new("1", "U2", "is prod down?"),
    ]);
    let prompter = ScriptedPrompter::new([
        Answer::select(CREATE_LABEL),
        Answer::input("outage"),
        Answer::Confirm(true),
        Answer::Confirm(false),
    ]);
    let mut config = config(&path);
    config.ignored_user_ids = HashSet::from(["BOT".to_string()]);

    let summary = run(&api, &prompter, config).await.unwrap();
    assert_eq!(summary.total_records, 1);

    let file = DatasetFile::load(&path, true).unwrap();
    assert_eq!(file.data.keys().collect::<Vec<_>>(), vec!["1-U2"]);
    assert_eq!(file.latest_timestamp.as_deref(), Some("1"));
}

#[tokio::test]
async fn test_batches_continue_until_channel_exhausted() {
    let dir = TempDir::new().unwrap();
    let path = data_file(&dir);

    let api = FakeChannel::new(vec![
        Message::new("5", "U1", "five"),
        Message::new("4", "U1", "four"),
        Message::new("3", "U1", "three"),
    ]);
    let prompter = ScriptedPrompter::new([
        // batch [5, 4]
        Answer::select("ignore"),
        Answer::select("ignore"),
        Answer::Confirm(true),
        Answer::Confirm(true),
        // batch [3]
        Answer::select("ignore"),
        Answer::Confirm(true),
        Answer::Confirm(true),
        // empty batch ends the run without prompting
    ]);
    let mut config = config(&path);
    config.batch_size = 2;

    let summary = run(&api, &prompter, config).await.unwrap();
    assert_eq!(summary.batches, 3);
    assert_eq!(summary.total_records, 3);
    assert_eq!(summary.latest_timestamp.as_deref(), Some("3"));
    assert_eq!(prompter.remaining(), 0);
}

#[tokio::test]
async fn test_resumes_from_persisted_cursor() {
    let dir = TempDir::new().unwrap();
    let path = data_file(&dir);
    DatasetFile::new(Dataset::new(), Some("3".to_string()))
        .persist(&path)
        .unwrap();

    let api = FakeChannel::new(vec![
        Message::new("5", "U1", "five"),
        Message::new("4", "U1", "four"),
        Message::new("3", "U1", "three"),
        Message::new("2", "U1", "two"),
    ]);
    let prompter = ScriptedPrompter::new([
        Answer::select("ignore"),
        Answer::Confirm(true),
        Answer::Confirm(false),
    ]);

    run(&api, &prompter, config(&path)).await.unwrap();

    let file = DatasetFile::load(&path, true).unwrap();
    assert_eq!(file.data.keys().collect::<Vec<_>>(), vec!["2-U1"]);
    assert_eq!(file.latest_timestamp.as_deref(), Some("2"));
}

#[tokio::test]
async fn test_empty_channel_keeps_previous_cursor() {
    let dir = TempDir::new().unwrap();
    let path = data_file(&dir);
    DatasetFile::new(Dataset::new(), Some("1".to_string()))
        .persist(&path)
        .unwrap();

    let api = FakeChannel::new(vec![Message::new("1", "U1", "oldest")]);
    let prompter = ScriptedPrompter::new([]);

    let summary = run(&api, &prompter, config(&path)).await.unwrap();
    assert_eq!(summary.batches, 1);
    assert_eq!(summary.latest_timestamp.as_deref(), Some("1"));
    assert!(prompter.asked().is_empty());
}
