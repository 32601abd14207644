#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;

use comet_core::mutations::parse_mutation_data;
use comet_core::{CometError, IndexedMutations, MutationDataset};
use comet_mcmc::{ChainTable, ComputationContext, RawRow, RawSample, SampleRequest, SamplingEngine};

/// Five genes A..E spread over six patients.
pub const FIVE_GENES: &str = "P1\tA\tB\nP2\tC\nP3\tD\tE\nP4\tA\nP5\tB\tC\nP6\tE\n";

pub fn dataset(matrix: &str) -> MutationDataset {
    parse_mutation_data(matrix.as_bytes(), None, None, 0).unwrap()
}

pub fn indexed(matrix: &str) -> IndexedMutations {
    IndexedMutations::from_dataset(&dataset(matrix), &[])
}

pub fn names(genes: &[&str]) -> Vec<String> {
    genes.iter().map(|gene| gene.to_string()).collect()
}

pub fn row(genes: &[usize], weight: f64, table_count: u8) -> RawRow {
    RawRow {
        genes: genes.to_vec(),
        weight,
        table_count,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggedRequest {
    pub iterations: u64,
    pub initial_solution: Vec<usize>,
}

/// Engine that replays a fixed sample and a queue of metric values.
#[derive(Debug, Default)]
pub struct ScriptedEngine {
    pub sample: Option<RawSample>,
    pub metrics: RefCell<VecDeque<f64>>,
    pub requests: Vec<LoggedRequest>,
    pub metric_calls: RefCell<Vec<u64>>,
}

impl ScriptedEngine {
    pub fn new(sample: RawSample, metrics: &[f64]) -> Self {
        Self {
            sample: Some(sample),
            metrics: RefCell::new(metrics.iter().copied().collect()),
            ..Self::default()
        }
    }
}

impl SamplingEngine for ScriptedEngine {
    fn sample(
        &mut self,
        _ctx: &mut ComputationContext,
        request: &SampleRequest<'_>,
    ) -> Result<Vec<RawSample>, CometError> {
        self.requests.push(LoggedRequest {
            iterations: request.iterations,
            initial_solution: request.initial_solution.to_vec(),
        });
        let emitted = request.iterations / request.step_length;
        Ok(match &self.sample {
            Some(sample) => (0..emitted).map(|_| sample.clone()).collect(),
            None => Vec::new(),
        })
    }

    fn convergence_metric(
        &self,
        _tables: &[ChainTable],
        samples_per_chain: u64,
    ) -> Result<f64, CometError> {
        self.metric_calls.borrow_mut().push(samples_per_chain);
        Ok(self.metrics.borrow_mut().pop_front().unwrap_or(1.0))
    }
}
