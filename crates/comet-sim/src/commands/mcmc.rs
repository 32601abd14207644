use std::collections::BTreeMap;
use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use comet_core::mutations::read_ordered_names;
use comet_core::IndexedMutations;
use comet_mcmc::determinism::planner_rng;
use comet_mcmc::manifest::provenance_for;
use comet_mcmc::precomputed::load_precomputed_scores;
use comet_mcmc::{
    rank, write_report_file, ComputationContext, ConvergenceController, ExclusivityEngine,
    InitialSolutionPlanner, RunConfig, RunParameters,
};
use tracing::info;

use super::{prefixed_path, DataArgs};

#[derive(Args, Debug)]
pub struct McmcArgs {
    /// Prefix for the `.sum.tsv` results and `.para.json` parameter files.
    #[arg(short = 'o', long)]
    pub output_prefix: String,
    #[command(flatten)]
    pub data: DataArgs,
    /// YAML run configuration; flags below override its values.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Size of each gene set.
    #[arg(short = 'k', long = "gene-set-sizes", num_args = 1..)]
    pub gene_set_sizes: Vec<usize>,
    /// Initial iterations per chain.
    #[arg(short = 'N', long)]
    pub num_iterations: Option<u64>,
    /// Iteration cap for budget growth.
    #[arg(long = "n-stop")]
    pub n_stop: Option<u64>,
    /// Iterations between recorded samples.
    #[arg(short = 's', long)]
    pub step_length: Option<u64>,
    /// Starting genes, listed slot by slot.
    #[arg(long = "init", num_args = 1..)]
    pub initial_solution: Vec<String>,
    /// Weight amplifier.
    #[arg(long = "accelerator")]
    pub amplifier: Option<u32>,
    /// File listing subtype labels, one per line.
    #[arg(long)]
    pub subtype: Option<PathBuf>,
    /// Number of independent chains.
    #[arg(short = 'r', long)]
    pub num_chains: Option<usize>,
    /// Maximum accumulated table mass for the exact test.
    #[arg(long)]
    pub exact_cut: Option<f64>,
    /// P-value below which the more accurate test is used.
    #[arg(long)]
    pub binom_cut: Option<f64>,
    /// Maximum co-occurrences for the more accurate test.
    #[arg(long = "nt")]
    pub co_occurrence_cutoff: Option<usize>,
    /// Total variation distance treated as converged.
    #[arg(long = "tv", alias = "total-distance-cutoff")]
    pub total_distance_cutoff: Option<f64>,
    /// Budget growth factor between rounds.
    #[arg(long)]
    pub growth_factor: Option<f64>,
    /// Permutation rounds used by the reference engine.
    #[arg(long)]
    pub permutations: Option<usize>,
    /// Results file from an earlier run whose set scores are reused.
    #[arg(long)]
    pub precomputed_scores: Option<PathBuf>,
    /// Master seed; defaults to the current time.
    #[arg(long)]
    pub seed: Option<u64>,
}

impl McmcArgs {
    fn resolve_config(&self) -> Result<RunConfig, Box<dyn Error>> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_yaml_file(path)?,
            None => RunConfig::default(),
        };
        if !self.gene_set_sizes.is_empty() {
            config.gene_set_sizes = self.gene_set_sizes.clone();
        }
        if !self.initial_solution.is_empty() {
            config.initial_solution = self.initial_solution.clone();
        }
        override_with(&mut config.num_iterations, self.num_iterations);
        override_with(&mut config.n_stop, self.n_stop);
        override_with(&mut config.step_length, self.step_length);
        override_with(&mut config.amplifier, self.amplifier);
        override_with(&mut config.num_chains, self.num_chains);
        override_with(&mut config.exact_cut, self.exact_cut);
        override_with(&mut config.binom_cut, self.binom_cut);
        override_with(&mut config.co_occurrence_cutoff, self.co_occurrence_cutoff);
        override_with(&mut config.total_distance_cutoff, self.total_distance_cutoff);
        override_with(&mut config.growth_factor, self.growth_factor);
        override_with(&mut config.permutations, self.permutations);
        override_with(&mut config.seed, self.seed);
        config.validate()?;
        Ok(config)
    }

    fn inputs(&self) -> BTreeMap<String, String> {
        let mut inputs = BTreeMap::new();
        inputs.insert("output_prefix".to_string(), self.output_prefix.clone());
        let files = [
            ("mutation_matrix", Some(&self.data.mutation_matrix)),
            ("patient_file", self.data.patient_file.as_ref()),
            ("gene_file", self.data.gene_file.as_ref()),
            ("subtype", self.subtype.as_ref()),
            ("precomputed_scores", self.precomputed_scores.as_ref()),
            ("config", self.config.as_ref()),
        ];
        for (name, path) in files {
            if let Some(path) = path {
                inputs.insert(name.to_string(), path.display().to_string());
            }
        }
        inputs.insert("min_freq".to_string(), self.data.min_freq.to_string());
        inputs
    }
}

fn override_with<T: Copy>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

pub fn run(args: &McmcArgs) -> Result<(), Box<dyn Error>> {
    let config = args.resolve_config()?;
    let dataset = args.data.load()?;
    let subtypes = match &args.subtype {
        Some(path) => read_ordered_names(path)?,
        None => Vec::new(),
    };
    let data = IndexedMutations::from_dataset(&dataset, &subtypes);
    info!(
        genes = data.num_genes(),
        patients = data.num_patients(),
        subtypes = data.subtype_count,
        seed = config.seed,
        "loaded mutation data"
    );

    let mut engine = ExclusivityEngine::new(config.permutations);
    let mut ctx =
        ComputationContext::acquire(data.num_genes().max(data.num_patients()), config.seed);
    if let Some(path) = &args.precomputed_scores {
        load_precomputed_scores(&mut engine, &data, path)?;
    }

    let plan = InitialSolutionPlanner::new(&dataset, &config.gene_set_sizes)
        .with_subtypes(data.subtype_count > 0)
        .plan(
            config.num_chains,
            &config.initial_solution,
            &mut planner_rng(config.seed),
        )?;
    let controller = ConvergenceController::new(&data, &config);
    let outcome = if config.num_chains == 1 {
        let start = plan.starts.first().map(Vec::as_slice).unwrap_or(&[]);
        controller.run_single(&mut engine, &mut ctx, start)?
    } else {
        controller.run(&mut engine, &mut ctx, plan)?
    };
    ctx.release();

    let rows = rank(&outcome.table);
    let results = prefixed_path(&args.output_prefix, ".sum.tsv")?;
    write_report_file(&results, &config.gene_set_sizes, &rows)?;

    let provenance = provenance_for(&args.data.mutation_matrix, config.seed)?;
    let parameters = RunParameters::from_outcome(&config, args.inputs(), &outcome, provenance);
    let parameters_path = prefixed_path(&args.output_prefix, ".para.json")?;
    parameters.write(&parameters_path)?;

    info!(
        collections = rows.len(),
        total_distance = outcome.total_distance,
        stop_reason = ?outcome.stop_reason,
        results = %results.display(),
        "run complete"
    );
    Ok(())
}
