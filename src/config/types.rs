use std::time::Duration;

use serde::Deserialize;

use crate::args::parse_duration_value;
use crate::error::ValidationError;

/// Settings accepted from `thrash.toml` / `thrash.json`.
///
/// Every field is optional; anything absent falls back to the CLI value.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub url: Option<String>,
    pub requests: Option<usize>,
    pub concurrency: Option<usize>,
    pub timeout: Option<DurationValue>,
    pub histogram: Option<bool>,
    pub buckets: Option<usize>,
    pub print_errors: Option<bool>,
    pub profile: Option<bool>,
    pub profile_addr: Option<String>,
    pub no_progress: Option<bool>,
}

/// A duration written either as whole seconds or as text like `"250ms"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(0) => Err(ValidationError::DurationZero),
            DurationValue::Seconds(secs) => Ok(Duration::from_secs(*secs)),
            DurationValue::Text(text) => parse_duration_value(text),
        }
    }
}
