//! Error surface shared by the CoMEt crates.

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Code, message and key/value context carried by every [`CometError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Short kebab-case code, stable across releases.
    pub code: String,
    /// What went wrong.
    pub message: String,
    /// Offending paths, gene names, sizes.
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// How to fix it, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Payload with no context.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds (or replaces) a context entry.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Attaches a remediation hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            let pairs: Vec<String> = self
                .context
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect();
            write!(f, " | context: [{}]", pairs.join(", "))?;
        }
        match &self.hint {
            Some(hint) => write!(f, " | hint: {hint}"),
            None => Ok(()),
        }
    }
}

/// Every failure the driver can report, grouped by where it arose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum CometError {
    /// Unusable settings, caught before sampling starts.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Malformed input files or unknown genes.
    #[error("data error: {0}")]
    Data(ErrorInfo),
    /// Raised by or on behalf of the scoring engine.
    #[error("engine error: {0}")]
    Engine(ErrorInfo),
    /// Filesystem failures.
    #[error("io error: {0}")]
    Io(ErrorInfo),
    /// JSON or YAML encoding failures.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl CometError {
    /// Payload of any variant.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            CometError::Config(info)
            | CometError::Data(info)
            | CometError::Engine(info)
            | CometError::Io(info)
            | CometError::Serde(info) => info,
        }
    }

    /// Wraps an I/O failure on `path` under `code`.
    pub fn io(code: &str, path: &Path, err: io::Error) -> Self {
        CometError::Io(
            ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()),
        )
    }
}
