mod common;

use std::path::PathBuf;

use comet_core::{CometError, WeightFunction};
use comet_mcmc::exhaustive::{
    filter_enumeration, output_path, run_exhaustive, write_exhaustive, INVALID_PROBABILITY,
};
use comet_mcmc::{ComputationContext, EnumeratedSet, ExclusivityEngine, ExhaustiveConfig};

use common::{indexed, FIVE_GENES};

fn enumerated(genes: &[usize], weight: f64, probability: f64) -> EnumeratedSet {
    EnumeratedSet {
        genes: genes.to_vec(),
        weight,
        table_count: 2,
        probability,
    }
}

#[test]
fn invalid_sets_are_dropped_and_rest_sorted() {
    let data = indexed(FIVE_GENES);
    let rows = filter_enumeration(
        &data,
        vec![
            enumerated(&[0, 1], 0.5, 0.6),
            enumerated(&[0, 2], 9.0, INVALID_PROBABILITY),
            enumerated(&[1, 2], 2.0, 0.13),
            enumerated(&[3, 4], 0.5, 0.6),
        ],
    )
    .unwrap();
    let keys: Vec<String> = rows.iter().map(|row| row.genes.join(",")).collect();
    assert_eq!(keys, vec!["B,C", "A,B", "D,E"]);
}

#[test]
fn output_path_names_size_and_function() {
    assert_eq!(
        output_path("out/run", 3, WeightFunction::Permutation),
        PathBuf::from("out/run-k3-permutation-exhaustive.tsv")
    );
}

#[test]
fn written_rows_carry_genes_pvalue_and_weight() {
    let data = indexed(FIVE_GENES);
    let rows = filter_enumeration(&data, vec![enumerated(&[1, 0], 0.25, 0.5)]).unwrap();
    let mut out = Vec::new();
    write_exhaustive(&mut out, &rows).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text, "#Gene set\tP-value\tFreq\tWeight\nA, B\t0.5\t0.25\n");
}

#[test]
fn reference_engine_enumerates_every_pair() {
    let data = indexed(FIVE_GENES);
    let mut engine = ExclusivityEngine::new(50);
    let mut ctx = ComputationContext::acquire(6, 4);
    let config = ExhaustiveConfig {
        seed: 4,
        ..ExhaustiveConfig::new(2, WeightFunction::Binomial)
    };
    let rows = run_exhaustive(&mut engine, &mut ctx, &data, &config).unwrap();
    assert_eq!(rows.len(), 10);
    assert!(rows.windows(2).all(|pair| pair[0].weight >= pair[1].weight));
    assert!(rows.iter().all(|row| (0.0..=1.0).contains(&row.probability)));
}

#[test]
fn threshold_marks_weak_sets_invalid() {
    let data = indexed(FIVE_GENES);
    let mut engine = ExclusivityEngine::new(50);
    let mut ctx = ComputationContext::acquire(6, 4);
    let config = ExhaustiveConfig {
        pval_threshold: 0.0,
        ..ExhaustiveConfig::new(2, WeightFunction::Binomial)
    };
    let rows = run_exhaustive(&mut engine, &mut ctx, &data, &config).unwrap();
    assert!(rows.is_empty());
}

#[test]
fn exact_weight_function_is_unsupported() {
    let data = indexed(FIVE_GENES);
    let mut engine = ExclusivityEngine::new(50);
    let mut ctx = ComputationContext::acquire(6, 4);
    let err = run_exhaustive(
        &mut engine,
        &mut ctx,
        &data,
        &ExhaustiveConfig::new(2, WeightFunction::Exact),
    )
    .unwrap_err();
    assert!(matches!(err, CometError::Engine(_)));
    assert_eq!(err.info().code, "weight-function-unsupported");
}
