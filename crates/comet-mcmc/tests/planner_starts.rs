mod common;

use std::collections::BTreeSet;

use comet_core::{CometError, GeneSet, MutationDataset, RngHandle};
use comet_mcmc::{InitialSeeder, InitialSolutionPlanner, SeederParams};

use common::{dataset, names, ScriptedEngine, FIVE_GENES};

struct FixedSeeder {
    sets: Vec<Vec<&'static str>>,
}

impl InitialSeeder for FixedSeeder {
    fn name(&self) -> &str {
        "fixed"
    }

    fn propose(
        &self,
        _dataset: &MutationDataset,
        params: &SeederParams,
    ) -> Result<Vec<(GeneSet, f64)>, CometError> {
        assert_eq!(params.min_size, params.max_size);
        Ok(self
            .sets
            .iter()
            .map(|genes| (GeneSet::new(genes.iter().copied()), 1.0))
            .collect())
    }
}

#[test]
fn short_user_solution_is_padded_with_distinct_genes() {
    let data = dataset(FIVE_GENES);
    let planner = InitialSolutionPlanner::new(&data, &[3]);
    let mut rng = RngHandle::from_seed(11);
    let plan = planner.plan(2, &names(&["A"]), &mut rng).unwrap();

    let start = &plan.starts[0];
    assert_eq!(start.len(), 3);
    assert_eq!(start[0], "A");
    let distinct: BTreeSet<_> = start.iter().collect();
    assert_eq!(distinct.len(), 3);
    assert!(start.iter().all(|gene| data.contains_gene(gene)));
    assert!(plan.starts[1].is_empty());
    assert_eq!(plan.tables.len(), 2);

    let again = planner
        .plan(2, &names(&["A"]), &mut RngHandle::from_seed(11))
        .unwrap();
    assert_eq!(again.starts, plan.starts);
}

#[test]
fn oversized_user_solution_fails_before_sampling() {
    let data = dataset(FIVE_GENES);
    let engine = ScriptedEngine::default();
    let planner = InitialSolutionPlanner::new(&data, &[1, 1]);
    let err = planner
        .plan(1, &names(&["A", "B", "C"]), &mut RngHandle::from_seed(1))
        .unwrap_err();
    assert!(matches!(err, CometError::Config(_)));
    assert_eq!(err.info().code, "initial-solution-size");
    assert!(engine.requests.is_empty());
}

#[test]
fn unknown_and_repeated_genes_are_rejected() {
    let data = dataset(FIVE_GENES);
    let planner = InitialSolutionPlanner::new(&data, &[3]);
    let mut rng = RngHandle::from_seed(3);
    let unknown = planner.plan(1, &names(&["A", "Z"]), &mut rng).unwrap_err();
    assert_eq!(unknown.info().code, "initial-solution-gene");
    let repeated = planner.plan(1, &names(&["A", "A"]), &mut rng).unwrap_err();
    assert_eq!(repeated.info().code, "initial-solution-duplicate");
}

#[test]
fn seeder_supplies_one_extra_start() {
    let data = dataset(FIVE_GENES);
    let seeder = FixedSeeder {
        sets: vec![vec!["A", "B"], vec!["C", "D"]],
    };
    let plan = InitialSolutionPlanner::new(&data, &[2, 2])
        .with_seeder(Some(&seeder))
        .plan(3, &names(&["E", "A", "B", "C"]), &mut RngHandle::from_seed(5))
        .unwrap();
    assert_eq!(plan.starts[0], names(&["E", "A", "B", "C"]));
    assert_eq!(plan.starts[1], names(&["A", "B", "C", "D"]));
    assert!(plan.starts[2].is_empty());
}

#[test]
fn seeder_is_skipped_for_subtypes_and_mixed_sizes() {
    let data = dataset(FIVE_GENES);
    let seeder = FixedSeeder {
        sets: vec![vec!["A", "B"], vec!["C", "D"]],
    };
    let subtyped = InitialSolutionPlanner::new(&data, &[2, 2])
        .with_seeder(Some(&seeder))
        .with_subtypes(true)
        .plan(2, &[], &mut RngHandle::from_seed(5))
        .unwrap();
    assert!(subtyped.starts.iter().all(Vec::is_empty));

    let mixed = InitialSolutionPlanner::new(&data, &[2, 3])
        .with_seeder(Some(&seeder))
        .plan(2, &[], &mut RngHandle::from_seed(5))
        .unwrap();
    assert!(mixed.starts.iter().all(Vec::is_empty));
}

#[test]
fn seeder_size_mismatch_is_fatal() {
    let data = dataset(FIVE_GENES);
    let seeder = FixedSeeder {
        sets: vec![vec!["A", "B", "C"], vec!["D"]],
    };
    let err = InitialSolutionPlanner::new(&data, &[2, 2])
        .with_seeder(Some(&seeder))
        .plan(2, &[], &mut RngHandle::from_seed(5))
        .unwrap_err();
    assert_eq!(err.info().code, "seeder-size");
}

#[test]
fn extra_starts_are_dropped_for_single_chain() {
    let data = dataset(FIVE_GENES);
    let seeder = FixedSeeder {
        sets: vec![vec!["A", "B"], vec!["C", "D"]],
    };
    let plan = InitialSolutionPlanner::new(&data, &[2, 2])
        .with_seeder(Some(&seeder))
        .plan(1, &names(&["A", "B", "C", "E"]), &mut RngHandle::from_seed(5))
        .unwrap();
    assert_eq!(plan.starts, vec![names(&["A", "B", "C", "E"])]);
    assert_eq!(plan.tables.len(), 1);
}
