use std::collections::BTreeMap;
use std::fs;

use comet_mcmc::manifest::{file_hash, provenance_for};
use comet_mcmc::{ChainTable, RunConfig, RunOutcome, RunParameters, StopReason};

#[test]
fn yaml_fills_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.yaml");
    fs::write(&path, "gene_set_sizes: [3, 3]\nnum_chains: 4\nseed: 12\n").unwrap();
    let config = RunConfig::from_yaml_file(&path).unwrap();
    assert_eq!(config.gene_set_sizes, vec![3, 3]);
    assert_eq!(config.num_chains, 4);
    assert_eq!(config.num_iterations, 1_000);
    assert_eq!(config.n_stop, 100_000_000);
    assert_eq!(config.step_length, 100);
    assert_eq!(config.total_distance_cutoff, 0.005);
    assert_eq!(config.total_genes(), 6);
    config.validate().unwrap();
}

#[test]
fn validation_rejects_unusable_settings() {
    let base = RunConfig {
        gene_set_sizes: vec![2],
        ..RunConfig::default()
    };
    let cases = [
        RunConfig {
            gene_set_sizes: Vec::new(),
            ..base.clone()
        },
        RunConfig {
            gene_set_sizes: vec![2, 0],
            ..base.clone()
        },
        RunConfig {
            step_length: 0,
            ..base.clone()
        },
        RunConfig {
            num_chains: 0,
            ..base.clone()
        },
        RunConfig {
            growth_factor: 1.0,
            ..base.clone()
        },
    ];
    for config in cases {
        let err = config.validate().unwrap_err();
        assert_eq!(err.info().code, "invalid-config");
    }
}

#[test]
fn parameters_round_trip_through_json() {
    let dir = tempfile::tempdir().unwrap();
    let matrix = dir.path().join("matrix.tsv");
    fs::write(&matrix, "P1\tA\nP2\tB\n").unwrap();

    let config = RunConfig {
        gene_set_sizes: vec![1],
        seed: 5,
        ..RunConfig::default()
    };
    let outcome = RunOutcome {
        table: ChainTable::new(),
        stop_reason: StopReason::Capped,
        total_distance: 0.25,
        budgets: vec![1_000, 1_500],
        rounds: 2,
    };
    let mut inputs = BTreeMap::new();
    inputs.insert("mutation_matrix".to_string(), matrix.display().to_string());
    let provenance = provenance_for(&matrix, config.seed).unwrap();
    assert_eq!(provenance.input_hash, file_hash(&matrix).unwrap());
    assert_eq!(provenance.input_hash.len(), 64);

    let params = RunParameters::from_outcome(&config, inputs, &outcome, provenance);
    let path = dir.path().join("nested").join("run.para.json");
    params.write(&path).unwrap();
    let restored = RunParameters::load(&path).unwrap();
    assert_eq!(restored, params);

    let json = fs::read_to_string(&path).unwrap();
    assert!(json.contains("\"stop_reason\": \"capped\""));
}
