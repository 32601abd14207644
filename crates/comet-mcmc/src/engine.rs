use comet_core::errors::ErrorInfo;
use comet_core::{CometError, IndexedMutations, ScoreMethod, WeightFunction};

use crate::context::ComputationContext;
use crate::records::ChainTable;

/// One sampling call's inputs, in the engine's indexed vocabulary.
#[derive(Debug, Clone, Copy)]
pub struct SampleRequest<'a> {
    /// Indexed mutation data (carries m, n, case counts and subtype count).
    pub data: &'a IndexedMutations,
    /// Size of each slot.
    pub gene_set_sizes: &'a [usize],
    /// Iterations to execute in this call.
    pub iterations: u64,
    /// Iterations between emitted samples.
    pub step_length: u64,
    /// Weight amplifier.
    pub amplifier: u32,
    /// Maximum co-occurrence count for the accurate test.
    pub co_occurrence_cutoff: usize,
    /// P-value below which the accurate test is attempted.
    pub hybrid_pval_threshold: f64,
    /// Accumulated table mass at which the exact test stops.
    pub exact_cut: f64,
    /// Flat starting gene indices; empty lets the engine choose a random start.
    pub initial_solution: &'a [usize],
}

/// One slot of a raw sample.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// Gene indices in the slot.
    pub genes: Vec<usize>,
    /// Weight of the set.
    pub weight: f64,
    /// Table-count code (0..=3).
    pub table_count: u8,
}

/// A sampled collection as emitted by the engine, one row per slot.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSample {
    /// Slots in engine order.
    pub rows: Vec<RawRow>,
}

/// One scored set produced by exhaustive enumeration.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumeratedSet {
    /// Gene indices.
    pub genes: Vec<usize>,
    /// Weight of the set.
    pub weight: f64,
    /// Table-count code (0..=3).
    pub table_count: u8,
    /// P-value, or `-1` when the set could not be tested.
    pub probability: f64,
}

/// Scoring and sampling engine consumed by the convergence driver.
///
/// Calls are blocking and not reentrant; the caller owns the
/// [`ComputationContext`] and passes it in explicitly.
pub trait SamplingEngine {
    /// Runs `request.iterations` MCMC iterations and returns the emitted samples.
    fn sample(
        &mut self,
        ctx: &mut ComputationContext,
        request: &SampleRequest<'_>,
    ) -> Result<Vec<RawSample>, CometError>;

    /// Cross-chain distance between the chains' empirical distributions,
    /// normalised by the nominal number of samples per chain. Lower means
    /// more agreement.
    fn convergence_metric(
        &self,
        tables: &[ChainTable],
        samples_per_chain: u64,
    ) -> Result<f64, CometError>;

    /// Selects the weight function used for subsequent scoring.
    fn set_weight_function(&mut self, function: WeightFunction) -> Result<(), CometError> {
        let _ = function;
        Ok(())
    }

    /// Seeds the engine's score cache with a previously computed result.
    fn load_precomputed_score(
        &mut self,
        probability: f64,
        set_size: usize,
        method: ScoreMethod,
        genes: &[usize],
    ) -> Result<(), CometError> {
        let _ = (probability, set_size, method, genes);
        Ok(())
    }

    /// Scores every gene set of size `set_size`.
    fn enumerate_exhaustive(
        &mut self,
        ctx: &mut ComputationContext,
        data: &IndexedMutations,
        set_size: usize,
        pval_threshold: f64,
    ) -> Result<Vec<EnumeratedSet>, CometError> {
        let _ = (ctx, data, pval_threshold);
        Err(CometError::Engine(
            ErrorInfo::new("exhaustive-unsupported", "engine does not support exhaustive enumeration")
                .with_context("set_size", set_size.to_string()),
        ))
    }
}
