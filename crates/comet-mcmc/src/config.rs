use std::fs;
use std::path::Path;

use comet_core::errors::ErrorInfo;
use comet_core::{CometError, WeightFunction};
use serde::{Deserialize, Serialize};

/// YAML-configurable parameters governing a multi-chain MCMC run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Size of each gene set; its length is the number of pathway slots t.
    #[serde(default)]
    pub gene_set_sizes: Vec<usize>,
    /// Initial iteration budget N per chain.
    #[serde(default = "default_num_iterations")]
    pub num_iterations: u64,
    /// Iteration cap; growth stops once the next budget would exceed it.
    #[serde(default = "default_n_stop")]
    pub n_stop: u64,
    /// Iterations between recorded samples.
    #[serde(default = "default_step_length")]
    pub step_length: u64,
    /// User supplied starting genes (flat list across slots).
    #[serde(default)]
    pub initial_solution: Vec<String>,
    /// Factor rescaling weights inside the target distribution.
    #[serde(default = "default_amplifier")]
    pub amplifier: u32,
    /// Number of independent chains R. A single chain skips convergence checks.
    #[serde(default = "default_num_chains")]
    pub num_chains: usize,
    /// Maximum accumulated table probability before the exact test stops.
    #[serde(default = "default_exact_cut")]
    pub exact_cut: f64,
    /// P-value below which the engine switches to its more accurate test.
    #[serde(default = "default_binom_cut")]
    pub binom_cut: f64,
    /// Maximum co-occurrence count for which the accurate test is attempted.
    #[serde(default = "default_co_occurrence_cutoff")]
    pub co_occurrence_cutoff: usize,
    /// Total variation distance below which the chains count as converged.
    #[serde(default = "default_total_distance_cutoff")]
    pub total_distance_cutoff: f64,
    /// Multiplicative budget growth between rounds.
    #[serde(default = "default_growth_factor")]
    pub growth_factor: f64,
    /// Permutation rounds used by engines that refine p-values by permutation.
    #[serde(default = "default_permutations")]
    pub permutations: usize,
    /// Master seed for the engine PRNG and the planner substream.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_num_iterations() -> u64 {
    1_000
}

fn default_n_stop() -> u64 {
    100_000_000
}

fn default_step_length() -> u64 {
    100
}

fn default_amplifier() -> u32 {
    1
}

fn default_num_chains() -> usize {
    1
}

fn default_exact_cut() -> f64 {
    0.001
}

fn default_binom_cut() -> f64 {
    0.005
}

fn default_co_occurrence_cutoff() -> usize {
    10
}

fn default_total_distance_cutoff() -> f64 {
    0.005
}

fn default_growth_factor() -> f64 {
    1.5
}

fn default_permutations() -> usize {
    1_000
}

/// Seed derived from the wall clock, used when none is configured.
pub fn default_seed() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            gene_set_sizes: Vec::new(),
            num_iterations: default_num_iterations(),
            n_stop: default_n_stop(),
            step_length: default_step_length(),
            initial_solution: Vec::new(),
            amplifier: default_amplifier(),
            num_chains: default_num_chains(),
            exact_cut: default_exact_cut(),
            binom_cut: default_binom_cut(),
            co_occurrence_cutoff: default_co_occurrence_cutoff(),
            total_distance_cutoff: default_total_distance_cutoff(),
            growth_factor: default_growth_factor(),
            permutations: default_permutations(),
            seed: default_seed(),
        }
    }
}

impl RunConfig {
    /// Loads a configuration from a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self, CometError> {
        let text = fs::read_to_string(path).map_err(|err| CometError::io("config-read", path, err))?;
        serde_yaml::from_str(&text).map_err(|err| {
            CometError::Serde(
                ErrorInfo::new("config-parse", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })
    }

    /// Number of pathway slots t.
    pub fn num_slots(&self) -> usize {
        self.gene_set_sizes.len()
    }

    /// Total number of genes in a collection, sum(ks).
    pub fn total_genes(&self) -> usize {
        self.gene_set_sizes.iter().sum()
    }

    /// Rejects configurations that cannot drive a run.
    pub fn validate(&self) -> Result<(), CometError> {
        let invalid = |field: &str, message: &str, value: String| {
            Err(CometError::Config(
                ErrorInfo::new("invalid-config", message)
                    .with_context("field", field)
                    .with_context("value", value),
            ))
        };
        if self.gene_set_sizes.is_empty() {
            return invalid("gene_set_sizes", "at least one gene set size is required", "[]".into());
        }
        if self.gene_set_sizes.contains(&0) {
            return invalid(
                "gene_set_sizes",
                "gene set sizes must be positive",
                format!("{:?}", self.gene_set_sizes),
            );
        }
        if self.num_iterations == 0 {
            return invalid("num_iterations", "iteration budget must be positive", "0".into());
        }
        if self.step_length == 0 {
            return invalid("step_length", "step length must be positive", "0".into());
        }
        if self.amplifier == 0 {
            return invalid("amplifier", "amplifier must be at least 1", "0".into());
        }
        if self.num_chains == 0 {
            return invalid("num_chains", "at least one chain is required", "0".into());
        }
        if !(self.growth_factor > 1.0) {
            return invalid(
                "growth_factor",
                "growth factor must exceed 1",
                self.growth_factor.to_string(),
            );
        }
        Ok(())
    }
}

/// Parameters for a single exhaustive enumeration pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExhaustiveConfig {
    /// Gene set size k.
    pub gene_set_size: usize,
    /// Weight function used to score each set.
    #[serde(default)]
    pub weight_function: WeightFunction,
    /// Sets whose p-value exceeds this threshold are marked invalid.
    #[serde(default = "default_pval_threshold")]
    pub pval_threshold: f64,
    /// Permutation rounds for the permutation weight function.
    #[serde(default = "default_permutations")]
    pub permutations: usize,
    /// Seed for the engine PRNG.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_pval_threshold() -> f64 {
    1.1
}

impl ExhaustiveConfig {
    /// Creates a configuration with defaults for everything but the set size.
    pub fn new(gene_set_size: usize, weight_function: WeightFunction) -> Self {
        Self {
            gene_set_size,
            weight_function,
            pval_threshold: default_pval_threshold(),
            permutations: default_permutations(),
            seed: default_seed(),
        }
    }
}
