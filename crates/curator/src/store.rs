//! On-disk dataset storage with timestamped snapshots.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info};

use crate::dataset::Dataset;
use crate::error::{CuratorError, Result};

/// Contents of a dataset file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetFile {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Dataset,
    /// Cursor for resuming: fetch messages older than this timestamp.
    #[serde(default)]
    pub latest_timestamp: Option<String>,
}

fn null_as_default<'de, D>(deserializer: D) -> std::result::Result<Dataset, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Dataset>::deserialize(deserializer)?.unwrap_or_default())
}

/// Whether a parsed JSON document is empty or false-like.
fn is_falsy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::Bool(b) => !b,
        serde_json::Value::Number(n) => n.as_f64() == Some(0.0),
        serde_json::Value::String(s) => s.is_empty(),
        serde_json::Value::Array(a) => a.is_empty(),
        serde_json::Value::Object(o) => o.is_empty(),
    }
}

impl DatasetFile {
    #[must_use]
    pub fn new(data: Dataset, latest_timestamp: Option<String>) -> Self {
        Self {
            data,
            latest_timestamp,
        }
    }

    /// Load the dataset file at `path`.
    ///
    /// A missing file yields an empty dataset. An existing file is refused
    /// with [`CuratorError::Conflict`] unless `allow_append` is set.
    pub fn load(path: &Path, allow_append: bool) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No data file, starting empty");
            return Ok(Self::default());
        }

        if !allow_append {
            return Err(CuratorError::Conflict {
                path: path.display().to_string(),
            });
        }

        let corrupt = |reason: String| CuratorError::Corrupt {
            path: path.display().to_string(),
            reason,
        };

        let content = std::fs::read_to_string(path)?;
        let value: serde_json::Value =
            serde_json::from_str(&content).map_err(|e| corrupt(e.to_string()))?;
        if is_falsy(&value) {
            return Err(corrupt("the file has no content".to_string()));
        }

        let file: Self = serde_json::from_value(value).map_err(|e| corrupt(e.to_string()))?;
        info!(
            path = %path.display(),
            records = file.data.len(),
            latest_timestamp = file.latest_timestamp.as_deref().unwrap_or("<none>"),
            "Loaded data file"
        );
        Ok(file)
    }

    /// Write the dataset to `path` and copy it to a timestamped snapshot.
    ///
    /// Returns the snapshot path. Snapshots are never pruned.
    pub fn persist(&self, path: &Path) -> Result<PathBuf> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        let snapshot = snapshot_path(path);
        std::fs::copy(path, &snapshot)?;
        info!(
            path = %path.display(),
            snapshot = %snapshot.display(),
            records = self.data.len(),
            "Wrote data file"
        );
        Ok(snapshot)
    }
}

/// `<path>.<unix time with fractional seconds>`
fn snapshot_path(path: &Path) -> PathBuf {
    let now = Utc::now();
    let mut name = OsString::from(path.as_os_str());
    name.push(format!(
        ".{}.{:06}",
        now.timestamp(),
        now.timestamp_subsec_micros()
    ));
    PathBuf::from(name)
}
