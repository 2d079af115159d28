//! Defaults, environment variable names and credential checks.

use std::collections::HashSet;

use crate::error::{CuratorError, Result};

/// Environment variable holding the Slack user token.
pub const ENV_SLACK_TOKEN: &str = "SLACK_TOKEN";

/// Environment variable holding comma-separated user IDs to skip.
pub const ENV_SLACK_IGNORE_USER_IDS: &str = "SLACK_IGNORE_USER_IDS";

/// Environment variable overriding the Slack Web API base URL.
pub const ENV_SLACK_API_URL: &str = "SLACK_API_URL";

/// Environment variable pointing at a model used for label suggestions.
pub const ENV_MODEL_DIR: &str = "CURATOR_MODEL_DIR";

pub const DEFAULT_DATA_FILE: &str = "slack_channel_data/latest.json";
pub const DEFAULT_MODEL_DIR: &str = "slack_channel_model";
pub const DEFAULT_BATCH_SIZE: usize = 10;
pub const DEFAULT_SLACK_API_URL: &str = "https://slack.com/api";

/// Prefix of Slack user tokens. Bot tokens lack the history scopes we need.
pub const USER_TOKEN_PREFIX: &str = "xoxp-";

/// Check that `token` is present and is a Slack user token.
pub fn validate_user_token(token: Option<&str>) -> Result<&str> {
    match token {
        None | Some("") => Err(CuratorError::Auth("No token was provided".to_string())),
        Some(token) if !token.starts_with(USER_TOKEN_PREFIX) => Err(CuratorError::Auth(
            "The provided token is invalid since it is not a user token, please use a user token instead"
                .to_string(),
        )),
        Some(token) => Ok(token),
    }
}

/// Parse a comma-separated list of user IDs.
#[must_use]
pub fn parse_user_ids(csv: Option<&str>) -> HashSet<String> {
    csv.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(ToString::to_string)
            .collect()
    })
    .unwrap_or_default()
}
