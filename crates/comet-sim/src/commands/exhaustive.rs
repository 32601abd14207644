use std::error::Error;

use clap::{Args, ValueEnum};
use comet_core::{IndexedMutations, WeightFunction};
use comet_mcmc::config::default_seed;
use comet_mcmc::determinism::exhaustive_seed;
use comet_mcmc::exhaustive::{output_path, run_exhaustive, write_exhaustive_file};
use comet_mcmc::{ComputationContext, ExclusivityEngine, ExhaustiveConfig};
use tracing::info;

use super::{ensure_parent, DataArgs};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum WeightArg {
    Exact,
    Binomial,
    Permutation,
}

impl From<WeightArg> for WeightFunction {
    fn from(arg: WeightArg) -> Self {
        match arg {
            WeightArg::Exact => WeightFunction::Exact,
            WeightArg::Binomial => WeightFunction::Binomial,
            WeightArg::Permutation => WeightFunction::Permutation,
        }
    }
}

#[derive(Args, Debug)]
pub struct ExhaustiveArgs {
    /// Prefix of the output file.
    #[arg(short = 'o', long)]
    pub output_prefix: String,
    #[command(flatten)]
    pub data: DataArgs,
    /// Gene set size.
    #[arg(short = 'k', long)]
    pub gene_set_size: usize,
    /// Weight function used to score each set.
    #[arg(short = 'w', long = "weight-func", value_enum, default_value_t = WeightArg::Binomial)]
    pub weight_function: WeightArg,
    /// Sets with a larger p-value are left out of the output.
    #[arg(long, default_value_t = 1.1)]
    pub pval_threshold: f64,
    /// Permutation rounds for the permutation weight function.
    #[arg(long, default_value_t = 1000)]
    pub permutations: usize,
    /// Master seed; defaults to the current time.
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn run(args: &ExhaustiveArgs) -> Result<(), Box<dyn Error>> {
    let config = ExhaustiveConfig {
        pval_threshold: args.pval_threshold,
        permutations: args.permutations,
        seed: args.seed.unwrap_or_else(default_seed),
        ..ExhaustiveConfig::new(args.gene_set_size, args.weight_function.into())
    };
    let dataset = args.data.load()?;
    let data = IndexedMutations::from_dataset(&dataset, &[]);

    let mut engine = ExclusivityEngine::new(config.permutations);
    let mut ctx = ComputationContext::acquire(
        data.num_genes().max(data.num_patients()),
        exhaustive_seed(config.seed),
    );
    let rows = run_exhaustive(&mut engine, &mut ctx, &data, &config)?;
    ctx.release();

    let path = output_path(&args.output_prefix, config.gene_set_size, config.weight_function);
    ensure_parent(&path)?;
    write_exhaustive_file(&path, &rows)?;
    info!(rows = rows.len(), output = %path.display(), "exhaustive results written");
    Ok(())
}
