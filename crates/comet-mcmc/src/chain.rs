use comet_core::{CometError, IndexedMutations};
use tracing::{debug, warn};

use crate::config::RunConfig;
use crate::context::ComputationContext;
use crate::convert::SolutionConverter;
use crate::engine::{SampleRequest, SamplingEngine};
use crate::records::{fold_sample, ChainTable};

/// Executes chain rounds against an engine and folds the samples into tables.
#[derive(Debug, Clone, Copy)]
pub struct ChainRunner<'a> {
    data: &'a IndexedMutations,
    config: &'a RunConfig,
}

impl<'a> ChainRunner<'a> {
    /// Creates a runner over indexed data and a validated configuration.
    pub fn new(data: &'a IndexedMutations, config: &'a RunConfig) -> Self {
        Self { data, config }
    }

    /// Runs `iterations` MCMC iterations from `start` (empty for a random
    /// start) and folds every sample into `table`.
    ///
    /// Returns the last sampled collection as a flat gene list for the next
    /// round. When no sample was emitted the start is carried forward.
    pub fn run<E: SamplingEngine + ?Sized>(
        &self,
        engine: &mut E,
        ctx: &mut ComputationContext,
        table: &mut ChainTable,
        iterations: u64,
        start: &[String],
    ) -> Result<Vec<String>, CometError> {
        let initial = self.data.indices_of(start)?;
        let request = SampleRequest {
            data: self.data,
            gene_set_sizes: &self.config.gene_set_sizes,
            iterations,
            step_length: self.config.step_length,
            amplifier: self.config.amplifier,
            co_occurrence_cutoff: self.config.co_occurrence_cutoff,
            hybrid_pval_threshold: self.config.binom_cut,
            exact_cut: self.config.exact_cut,
            initial_solution: &initial,
        };
        let samples = engine.sample(ctx, &request)?;

        let converter = SolutionConverter::new(&self.data.index_to_gene, self.config.amplifier);
        let mut new_keys = 0usize;
        for sample in &samples {
            if fold_sample(table, converter.convert(sample)?) {
                new_keys += 1;
            }
        }
        debug!(
            iterations,
            samples = samples.len(),
            new_keys,
            distinct = table.len(),
            "chain round folded"
        );

        match samples.last() {
            Some(last) => converter.warm_start(last),
            None => {
                warn!(
                    iterations,
                    step_length = self.config.step_length,
                    "engine emitted no samples; keeping previous start"
                );
                Ok(start.to_vec())
            }
        }
    }
}
