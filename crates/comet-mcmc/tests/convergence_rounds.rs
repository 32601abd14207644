mod common;

use comet_mcmc::convergence::{next_budget, SINGLE_CHAIN_DISTANCE};
use comet_mcmc::{
    CanonicalKey, ComputationContext, ConvergenceController, InitialPlan, RawSample, RunConfig,
    StopReason,
};

use common::{indexed, names, row, ScriptedEngine, FIVE_GENES};

fn config(chains: usize) -> RunConfig {
    RunConfig {
        gene_set_sizes: vec![2],
        num_iterations: 1_000,
        n_stop: 100_000,
        step_length: 100,
        num_chains: chains,
        seed: 9,
        ..RunConfig::default()
    }
}

fn plan(starts: Vec<Vec<String>>) -> InitialPlan {
    InitialPlan {
        tables: starts.iter().map(|_| Default::default()).collect(),
        starts,
    }
}

fn fixed_sample() -> RawSample {
    RawSample {
        rows: vec![row(&[3, 2], 1.0, 2)],
    }
}

#[test]
fn budget_grows_by_half_and_always_increases() {
    assert_eq!(next_budget(1_000, 1.5), 1_500);
    assert_eq!(next_budget(1_500, 1.5), 2_250);
    assert_eq!(next_budget(2_250, 1.5), 3_375);
    assert_eq!(next_budget(1, 1.5), 2);
}

#[test]
fn zero_distance_stops_after_first_round() {
    let data = indexed(FIVE_GENES);
    let config = config(2);
    let mut engine = ScriptedEngine::new(fixed_sample(), &[0.0]);
    let mut ctx = ComputationContext::acquire(6, config.seed);
    let outcome = ConvergenceController::new(&data, &config)
        .run(&mut engine, &mut ctx, plan(vec![Vec::new(), Vec::new()]))
        .unwrap();

    assert_eq!(outcome.stop_reason, StopReason::Converged);
    assert_eq!(outcome.rounds, 1);
    assert_eq!(outcome.budgets, vec![1_000]);
    assert_eq!(outcome.total_distance, 0.0);
    assert_eq!(engine.requests.len(), 2);
    assert_eq!(*engine.metric_calls.borrow(), vec![10]);

    let key = CanonicalKey::from_groups(vec![vec!["C", "D"]]);
    assert_eq!(outcome.table[&key].frequency, 20);
}

#[test]
fn cap_stops_growth_before_exceeding_limit() {
    let data = indexed(FIVE_GENES);
    let config = RunConfig {
        n_stop: 4_000,
        ..config(2)
    };
    let mut engine = ScriptedEngine::new(fixed_sample(), &[]);
    let mut ctx = ComputationContext::acquire(6, config.seed);
    let outcome = ConvergenceController::new(&data, &config)
        .run(&mut engine, &mut ctx, plan(vec![Vec::new(), Vec::new()]))
        .unwrap();

    assert_eq!(outcome.stop_reason, StopReason::Capped);
    assert_eq!(outcome.budgets, vec![1_000, 1_500, 2_250, 3_375]);
    assert_eq!(outcome.rounds, 4);
    let per_call: Vec<u64> = engine.requests.iter().map(|req| req.iterations).collect();
    assert_eq!(per_call, vec![1_000, 1_000, 500, 500, 750, 750, 1_125, 1_125]);
    assert_eq!(*engine.metric_calls.borrow(), vec![10, 15, 22, 33]);
}

#[test]
fn convergence_wins_over_cap_in_the_same_round() {
    let data = indexed(FIVE_GENES);
    let config = RunConfig {
        n_stop: 1_000,
        ..config(2)
    };
    let mut engine = ScriptedEngine::new(fixed_sample(), &[0.0]);
    let mut ctx = ComputationContext::acquire(6, config.seed);
    let outcome = ConvergenceController::new(&data, &config)
        .run(&mut engine, &mut ctx, plan(vec![Vec::new(), Vec::new()]))
        .unwrap();
    assert_eq!(outcome.stop_reason, StopReason::Converged);
}

#[test]
fn later_rounds_resume_from_last_sample() {
    let data = indexed(FIVE_GENES);
    let config = config(2);
    let mut engine = ScriptedEngine::new(fixed_sample(), &[1.0, 0.0]);
    let mut ctx = ComputationContext::acquire(6, config.seed);
    let outcome = ConvergenceController::new(&data, &config)
        .run(&mut engine, &mut ctx, plan(vec![names(&["A", "B"]), Vec::new()]))
        .unwrap();

    let starts: Vec<Vec<usize>> = engine
        .requests
        .iter()
        .map(|req| req.initial_solution.clone())
        .collect();
    assert_eq!(starts, vec![vec![0, 1], vec![], vec![2, 3], vec![2, 3]]);
    assert_eq!(outcome.rounds, 2);
    assert_eq!(outcome.budgets, vec![1_000, 1_500]);

    let key = CanonicalKey::from_groups(vec![vec!["C", "D"]]);
    assert_eq!(outcome.table[&key].frequency, 30);
}

#[test]
fn empty_round_keeps_previous_start() {
    let data = indexed(FIVE_GENES);
    let config = RunConfig {
        step_length: 5_000,
        ..config(2)
    };
    let mut engine = ScriptedEngine::new(fixed_sample(), &[1.0, 0.0]);
    let mut ctx = ComputationContext::acquire(6, config.seed);
    let outcome = ConvergenceController::new(&data, &config)
        .run(&mut engine, &mut ctx, plan(vec![names(&["A", "B"]), Vec::new()]))
        .unwrap();
    assert!(outcome.table.is_empty());
    assert_eq!(engine.requests[2].initial_solution, vec![0, 1]);
}

#[test]
fn single_chain_runs_once_without_metric() {
    let data = indexed(FIVE_GENES);
    let config = config(1);
    let mut engine = ScriptedEngine::new(fixed_sample(), &[0.0]);
    let mut ctx = ComputationContext::acquire(6, config.seed);
    let outcome = ConvergenceController::new(&data, &config)
        .run_single(&mut engine, &mut ctx, &names(&["A", "E"]))
        .unwrap();

    assert_eq!(outcome.stop_reason, StopReason::SingleChain);
    assert_eq!(outcome.total_distance, SINGLE_CHAIN_DISTANCE);
    assert_eq!(engine.requests.len(), 1);
    assert_eq!(engine.requests[0].initial_solution, vec![0, 4]);
    assert!(engine.metric_calls.borrow().is_empty());
}
