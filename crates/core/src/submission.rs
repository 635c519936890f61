//! Submission payload validation.
//!
//! The HTTP layer decodes the multipart form; everything that decides
//! whether a submission is acceptable lives here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Keys every job configuration must carry.
pub const REQUIRED_CONFIG_KEYS: [&str; 3] = ["metric", "search_budget", "objective"];

/// Upper bound for reported progress.
pub const MAX_PROGRESS: i64 = 100;

/// Free-form job configuration forwarded verbatim to the worker.
pub type JobConfig = serde_json::Map<String, serde_json::Value>;

/// Encoding of the uploaded dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetFormat {
    Csv,
    Json,
}

impl DatasetFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            DatasetFormat::Csv => "csv",
            DatasetFormat::Json => "json",
        }
    }
}

impl fmt::Display for DatasetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "csv" => Ok(DatasetFormat::Csv),
            "json" => Ok(DatasetFormat::Json),
            _ => Err(CoreError::Validation(
                "dataset_format must be 'csv' or 'json'".to_string(),
            )),
        }
    }
}

/// Parse the raw `config` form field and check its required keys.
pub fn parse_config(raw: &str) -> Result<JobConfig, CoreError> {
    if raw.trim().is_empty() {
        return Err(CoreError::Validation("config is required".to_string()));
    }
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| CoreError::Validation(format!("Invalid config JSON: {e}")))?;
    let serde_json::Value::Object(config) = value else {
        return Err(CoreError::Validation(
            "config must be a JSON object".to_string(),
        ));
    };
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &JobConfig) -> Result<(), CoreError> {
    for key in REQUIRED_CONFIG_KEYS {
        if !config.contains_key(key) {
            return Err(CoreError::Validation(format!("config.{key} is required")));
        }
    }
    Ok(())
}

/// Check a reported progress value and narrow it to a percentage.
pub fn validate_progress(progress: i64) -> Result<u8, CoreError> {
    if !(0..=MAX_PROGRESS).contains(&progress) {
        return Err(CoreError::Validation(format!(
            "progress must be between 0 and {MAX_PROGRESS}, got {progress}"
        )));
    }
    Ok(progress as u8)
}

/// A validated submission, ready to be handed to the dispatcher.
#[derive(Debug, Clone)]
pub struct JobSubmission {
    pub dataset: Vec<u8>,
    pub format: DatasetFormat,
    pub config: JobConfig,
}

impl JobSubmission {
    pub fn new(
        dataset: Vec<u8>,
        format: DatasetFormat,
        config: JobConfig,
    ) -> Result<Self, CoreError> {
        if dataset.is_empty() {
            return Err(CoreError::Validation("dataset must not be empty".to_string()));
        }
        validate_config(&config)?;
        Ok(Self {
            dataset,
            format,
            config,
        })
    }
}
