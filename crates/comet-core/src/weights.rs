//! Statistical test tags attached to scored gene sets.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{CometError, ErrorInfo};

/// Test variant that produced a gene-set weight (the engine's table-count code).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ScoreMethod {
    /// Exact test enumerated over every contingency table (code 0).
    Exact,
    /// Exact test stopped once the accumulated table mass passed the cutoff (code 1).
    ExactTruncated,
    /// Binomial approximation (code 2).
    Binomial,
    /// Permutation test (code 3).
    Permutation,
}

impl ScoreMethod {
    /// Decodes the engine's integer code.
    pub fn from_code(code: u8) -> Result<Self, CometError> {
        match code {
            0 => Ok(ScoreMethod::Exact),
            1 => Ok(ScoreMethod::ExactTruncated),
            2 => Ok(ScoreMethod::Binomial),
            3 => Ok(ScoreMethod::Permutation),
            other => Err(CometError::Engine(
                ErrorInfo::new("score-method-code", "table-count code outside 0..=3")
                    .with_context("code", other.to_string()),
            )),
        }
    }

    /// Integer code understood by the engine.
    pub fn code(self) -> u8 {
        match self {
            ScoreMethod::Exact => 0,
            ScoreMethod::ExactTruncated => 1,
            ScoreMethod::Binomial => 2,
            ScoreMethod::Permutation => 3,
        }
    }

    /// Single-letter weight-function tag used in reports.
    pub fn label(self) -> char {
        match self {
            ScoreMethod::Exact | ScoreMethod::ExactTruncated => 'E',
            ScoreMethod::Binomial => 'B',
            ScoreMethod::Permutation => 'P',
        }
    }

    /// Parses a report cell, accepting either a tag (`E`, `B`, `P`) or a numeric code.
    pub fn parse(cell: &str) -> Result<Self, CometError> {
        match cell.trim() {
            "E" => Ok(ScoreMethod::Exact),
            "B" => Ok(ScoreMethod::Binomial),
            "P" => Ok(ScoreMethod::Permutation),
            other => other
                .parse::<u8>()
                .map_err(|_| {
                    CometError::Data(
                        ErrorInfo::new("score-method-parse", "unrecognised weight function")
                            .with_context("value", other),
                    )
                })
                .and_then(Self::from_code),
        }
    }
}

impl fmt::Display for ScoreMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Weight function a caller can select for scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum WeightFunction {
    /// Exact test of mutual exclusivity.
    Exact,
    /// Binomial approximation, refined by permutation where the engine supports it.
    #[default]
    Binomial,
    /// Permutation test.
    Permutation,
}

impl WeightFunction {
    /// Name used in file names and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            WeightFunction::Exact => "exact",
            WeightFunction::Binomial => "binomial",
            WeightFunction::Permutation => "permutation",
        }
    }
}
