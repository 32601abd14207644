use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use comet_core::{load_mutation_data, MutationDataset};

pub mod exhaustive;
pub mod mcmc;

/// Input filters shared by both subcommands.
#[derive(clap::Args, Debug)]
pub struct DataArgs {
    /// Tab-separated mutation matrix, one patient per line.
    #[arg(short = 'm', long)]
    pub mutation_matrix: PathBuf,
    /// Drop genes mutated in fewer patients than this.
    #[arg(long = "min-freq", default_value_t = 0)]
    pub min_freq: usize,
    /// Restrict the analysis to the patients listed in this file.
    #[arg(long)]
    pub patient_file: Option<PathBuf>,
    /// Restrict the analysis to the genes listed in this file.
    #[arg(long)]
    pub gene_file: Option<PathBuf>,
}

impl DataArgs {
    pub fn load(&self) -> Result<MutationDataset, Box<dyn Error>> {
        Ok(load_mutation_data(
            &self.mutation_matrix,
            self.patient_file.as_deref(),
            self.gene_file.as_deref(),
            self.min_freq,
        )?)
    }
}

/// `<prefix><suffix>`, creating the prefix's directory when needed.
pub fn prefixed_path(prefix: &str, suffix: &str) -> Result<PathBuf, Box<dyn Error>> {
    let path = PathBuf::from(format!("{prefix}{suffix}"));
    ensure_parent(&path)?;
    Ok(path)
}

pub fn ensure_parent(path: &Path) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}
