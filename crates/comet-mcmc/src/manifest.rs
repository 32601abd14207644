use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use comet_core::errors::ErrorInfo;
use comet_core::{CometError, RunProvenance, SchemaVersion};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::RunConfig;
use crate::convergence::{RunOutcome, StopReason};

/// Parameters file written next to the results: configuration plus the
/// final convergence distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunParameters {
    /// Schema version of this payload.
    pub schema_version: SchemaVersion,
    /// Configuration used for the run.
    pub config: RunConfig,
    /// Input files and output prefix as given on the command line.
    #[serde(default)]
    pub inputs: BTreeMap<String, String>,
    /// Final cross-chain distance (1.0 for single-chain runs).
    pub total_distance: f64,
    /// Why the run stopped.
    pub stop_reason: StopReason,
    /// Number of rounds executed.
    pub rounds: usize,
    /// Cumulative per-chain budget of every round.
    pub budgets: Vec<u64>,
    /// Input hash, seed and tool versions.
    pub provenance: RunProvenance,
}

impl RunParameters {
    /// Collects the parameters of a finished run.
    pub fn from_outcome(
        config: &RunConfig,
        inputs: BTreeMap<String, String>,
        outcome: &RunOutcome,
        provenance: RunProvenance,
    ) -> Self {
        Self {
            schema_version: SchemaVersion::CURRENT,
            config: config.clone(),
            inputs,
            total_distance: outcome.total_distance,
            stop_reason: outcome.stop_reason,
            rounds: outcome.rounds,
            budgets: outcome.budgets.clone(),
            provenance,
        }
    }

    /// Writes the parameters to a JSON file.
    pub fn write(&self, path: &Path) -> Result<(), CometError> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| CometError::io("parameters-mkdir", parent, err))?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|err| {
            CometError::Serde(
                ErrorInfo::new("parameters-serialize", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        fs::write(path, json).map_err(|err| CometError::io("parameters-write", path, err))
    }

    /// Loads parameters from disk, rejecting files from an incompatible layout.
    pub fn load(path: &Path) -> Result<Self, CometError> {
        let contents =
            fs::read_to_string(path).map_err(|err| CometError::io("parameters-read", path, err))?;
        let parameters: Self = serde_json::from_str(&contents).map_err(|err| {
            CometError::Serde(
                ErrorInfo::new("parameters-parse", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        if !SchemaVersion::CURRENT.is_compatible_with(parameters.schema_version) {
            return Err(CometError::Serde(
                ErrorInfo::new("parameters-schema", "unsupported parameters file version")
                    .with_context("path", path.display().to_string())
                    .with_context("version", parameters.schema_version.to_string()),
            ));
        }
        Ok(parameters)
    }
}

/// Hex SHA-256 of a file's bytes.
pub fn file_hash(path: &Path) -> Result<String, CometError> {
    let bytes = fs::read(path).map_err(|err| CometError::io("hash-read", path, err))?;
    Ok(format!("{:x}", Sha256::digest(bytes)))
}

/// Provenance for a run over `matrix` with `seed`, stamped now.
pub fn provenance_for(matrix: &Path, seed: u64) -> Result<RunProvenance, CometError> {
    Ok(
        RunProvenance::new(file_hash(matrix)?, seed, chrono::Utc::now().to_rfc3339())
            .with_tool(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
    )
}
