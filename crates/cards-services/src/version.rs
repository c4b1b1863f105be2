//! Remote version check.

use std::time::Duration;

use cards_core::{VersionConfig, VersionField};
use reqwest::Client;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::instrument;

const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum VersionError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Version descriptor returned status {0}")]
    Status(u16),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Remote version descriptor.
///
/// The published file has been read through `cards`; `version` is the more
/// likely intended key. Which one is compared is chosen by `VersionField`.
/// Values are kept untyped: only a string equal to the local version counts
/// as a match.
#[derive(Debug, Clone, Default)]
pub struct VersionDescriptor {
    fields: Map<String, Value>,
}

impl VersionDescriptor {
    /// Parse a descriptor body. Valid JSON that is not an object has no fields.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let fields = match serde_json::from_str(text)? {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };
        Ok(Self { fields })
    }

    pub fn field(&self, field: VersionField) -> Option<&Value> {
        let key = match field {
            VersionField::Cards => "cards",
            VersionField::Version => "version",
        };
        self.fields.get(key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionStatus {
    UpToDate,
    /// `remote` is `None` when the descriptor lacks the compared field;
    /// non-string values are rendered as JSON
    UpdateAvailable { remote: Option<String> },
}

#[derive(Debug, Clone)]
pub struct VersionChecker {
    client: Client,
    url: String,
    local: String,
    field: VersionField,
}

impl VersionChecker {
    pub fn new(url: &str, local: &str, field: VersionField) -> Result<Self, VersionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            url: url.to_string(),
            local: local.to_string(),
            field,
        })
    }

    pub fn from_config(config: &VersionConfig) -> Result<Self, VersionError> {
        Self::new(&config.url, &config.local, config.field)
    }

    /// Compare the published version against the local one.
    ///
    /// A missing field or a non-string value counts as a mismatch.
    pub fn compare(&self, descriptor: &VersionDescriptor) -> VersionStatus {
        match descriptor.field(self.field) {
            Some(Value::String(remote)) if *remote == self.local => VersionStatus::UpToDate,
            Some(Value::String(remote)) => VersionStatus::UpdateAvailable {
                remote: Some(remote.clone()),
            },
            Some(other) => VersionStatus::UpdateAvailable {
                remote: Some(other.to_string()),
            },
            None => VersionStatus::UpdateAvailable { remote: None },
        }
    }

    #[instrument(skip(self), level = "info")]
    pub async fn check(&self) -> Result<VersionStatus, VersionError> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(VersionError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let descriptor = VersionDescriptor::from_json(&body)?;

        let result = self.compare(&descriptor);
        if let VersionStatus::UpdateAvailable { remote } = &result {
            tracing::info!(
                "New version available! local={} remote={:?}",
                self.local,
                remote
            );
        }
        Ok(result)
    }
}
