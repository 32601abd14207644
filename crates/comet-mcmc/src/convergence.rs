use comet_core::{CometError, IndexedMutations};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::chain::ChainRunner;
use crate::config::RunConfig;
use crate::context::ComputationContext;
use crate::engine::SamplingEngine;
use crate::planner::InitialPlan;
use crate::records::{merge_tables, ChainTable, GlobalTable};

/// Distance reported for runs that never evaluate convergence.
pub const SINGLE_CHAIN_DISTANCE: f64 = 1.0;

/// States of the adaptive convergence loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControllerState {
    /// First round, running the initial budget.
    Running,
    /// A later round, running the budget increment.
    Growing,
    /// Cross-chain distance fell below the cutoff.
    Converged,
    /// The next budget would exceed the iteration cap.
    Capped,
}

impl ControllerState {
    /// Returns whether the loop stops in this state.
    pub fn is_terminal(self) -> bool {
        matches!(self, ControllerState::Converged | ControllerState::Capped)
    }
}

/// Why a run finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopReason {
    /// Multi-chain run whose chains agreed.
    Converged,
    /// Multi-chain run stopped by the iteration cap.
    Capped,
    /// Single fixed-budget chain.
    SingleChain,
}

/// Result of a complete sampling run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    /// Merged table across all chains.
    pub table: GlobalTable,
    /// Why the run stopped.
    pub stop_reason: StopReason,
    /// Convergence distance at the final evaluation.
    pub total_distance: f64,
    /// Cumulative per-chain budget of every round that ran.
    pub budgets: Vec<u64>,
    /// Number of rounds executed.
    pub rounds: usize,
}

/// Next budget: `floor(current * factor)`, and always larger than `current`.
pub fn next_budget(current: u64, factor: f64) -> u64 {
    let grown = (current as f64 * factor).floor() as u64;
    grown.max(current + 1)
}

/// Grows chain budgets until the chains agree or the cap is reached.
#[derive(Debug, Clone, Copy)]
pub struct ConvergenceController<'a> {
    runner: ChainRunner<'a>,
    config: &'a RunConfig,
}

impl<'a> ConvergenceController<'a> {
    /// Creates a controller over indexed data and a validated configuration.
    pub fn new(data: &'a IndexedMutations, config: &'a RunConfig) -> Self {
        Self {
            runner: ChainRunner::new(data, config),
            config,
        }
    }

    /// Runs all chains of `plan` round by round until a terminal state.
    pub fn run<E: SamplingEngine + ?Sized>(
        &self,
        engine: &mut E,
        ctx: &mut ComputationContext,
        plan: InitialPlan,
    ) -> Result<RunOutcome, CometError> {
        let InitialPlan {
            mut starts,
            mut tables,
        } = plan;
        let mut state = ControllerState::Running;
        let mut budget = self.config.num_iterations;
        let mut delta = budget;
        let mut budgets = vec![budget];
        let mut rounds = 0usize;

        let total_distance = loop {
            rounds += 1;
            debug!(round = rounds, state = ?state, delta, "starting round");
            let mut last_samples = Vec::with_capacity(tables.len());
            for (chain, (table, start)) in tables.iter_mut().zip(&starts).enumerate() {
                let last = self.runner.run(engine, ctx, table, delta, start)?;
                debug!(chain, round = rounds, distinct = table.len(), "chain finished round");
                last_samples.push(last);
            }

            let samples_per_chain = budget / self.config.step_length;
            let distance = engine.convergence_metric(&tables, samples_per_chain)?;
            let proposed = next_budget(budget, self.config.growth_factor);
            state = if distance < self.config.total_distance_cutoff {
                ControllerState::Converged
            } else if proposed > self.config.n_stop {
                ControllerState::Capped
            } else {
                ControllerState::Growing
            };
            info!(round = rounds, budget, distance, next = ?state, "evaluated convergence");

            if state.is_terminal() {
                break distance;
            }
            delta = proposed - budget;
            budget = proposed;
            budgets.push(budget);
            starts = last_samples;
        };

        let stop_reason = match state {
            ControllerState::Converged => StopReason::Converged,
            _ => StopReason::Capped,
        };
        Ok(RunOutcome {
            table: merge_tables(&tables),
            stop_reason,
            total_distance,
            budgets,
            rounds,
        })
    }

    /// Runs one chain for the configured budget with no convergence check.
    pub fn run_single<E: SamplingEngine + ?Sized>(
        &self,
        engine: &mut E,
        ctx: &mut ComputationContext,
        start: &[String],
    ) -> Result<RunOutcome, CometError> {
        let mut table = ChainTable::new();
        self.runner
            .run(engine, ctx, &mut table, self.config.num_iterations, start)?;
        info!(budget = self.config.num_iterations, distinct = table.len(), "single chain finished");
        Ok(RunOutcome {
            table,
            stop_reason: StopReason::SingleChain,
            total_distance: SINGLE_CHAIN_DISTANCE,
            budgets: vec![self.config.num_iterations],
            rounds: 1,
        })
    }
}
