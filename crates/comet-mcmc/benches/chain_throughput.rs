use comet_core::mutations::parse_mutation_data;
use comet_core::IndexedMutations;
use comet_mcmc::records::merge_tables;
use comet_mcmc::{ComputationContext, ConvergenceController, ExclusivityEngine, RunConfig};
use criterion::{criterion_group, criterion_main, Criterion};

fn sample_data() -> IndexedMutations {
    let mut matrix = String::new();
    for patient in 0..60 {
        matrix.push_str(&format!("P{patient}"));
        for gene in 0..12 {
            if (patient * 7 + gene * 3) % 5 == 0 {
                matrix.push_str(&format!("\tG{gene}"));
            }
        }
        matrix.push('\n');
    }
    let dataset = parse_mutation_data(matrix.as_bytes(), None, None, 0).unwrap();
    IndexedMutations::from_dataset(&dataset, &[])
}

fn bench_chain(c: &mut Criterion) {
    let data = sample_data();
    let config = RunConfig {
        gene_set_sizes: vec![3, 3],
        num_iterations: 2_000,
        step_length: 10,
        seed: 42,
        ..RunConfig::default()
    };

    c.bench_function("single_chain_round", |b| {
        b.iter(|| {
            let mut engine = ExclusivityEngine::new(100);
            let mut ctx = ComputationContext::acquire(60, config.seed);
            ConvergenceController::new(&data, &config)
                .run_single(&mut engine, &mut ctx, &[])
                .unwrap()
        })
    });

    let mut engine = ExclusivityEngine::new(100);
    let mut ctx = ComputationContext::acquire(60, config.seed);
    let outcome = ConvergenceController::new(&data, &config)
        .run_single(&mut engine, &mut ctx, &[])
        .unwrap();
    let tables = vec![outcome.table.clone(), outcome.table.clone(), outcome.table];
    c.bench_function("merge_chain_tables", |b| b.iter(|| merge_tables(&tables)));
}

criterion_group!(benches, bench_chain);
criterion_main!(benches);
