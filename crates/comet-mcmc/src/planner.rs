use std::collections::BTreeSet;

use comet_core::errors::ErrorInfo;
use comet_core::{CometError, MutationDataset, RngHandle};
use tracing::{info, warn};

use crate::records::ChainTable;
use crate::seeder::{InitialSeeder, SeederParams};

/// Starting points and empty tables for every chain.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialPlan {
    /// Flat starting gene list per chain; empty means a random start.
    pub starts: Vec<Vec<String>>,
    /// One empty table per chain.
    pub tables: Vec<ChainTable>,
}

/// Builds the R starting solutions from user input, an optional seeder and
/// random starts.
pub struct InitialSolutionPlanner<'a> {
    dataset: &'a MutationDataset,
    gene_set_sizes: &'a [usize],
    seeder: Option<&'a dyn InitialSeeder>,
    subtypes_active: bool,
}

impl<'a> InitialSolutionPlanner<'a> {
    /// Creates a planner for the given dataset and slot sizes.
    pub fn new(dataset: &'a MutationDataset, gene_set_sizes: &'a [usize]) -> Self {
        Self {
            dataset,
            gene_set_sizes,
            seeder: None,
            subtypes_active: false,
        }
    }

    /// Makes a seeder available for one additional starting collection.
    pub fn with_seeder(mut self, seeder: Option<&'a dyn InitialSeeder>) -> Self {
        self.seeder = seeder;
        self
    }

    /// Marks the run as subtype-restricted, which disables the seeder.
    pub fn with_subtypes(mut self, active: bool) -> Self {
        self.subtypes_active = active;
        self
    }

    /// Plans `chains` starting lists.
    ///
    /// Fails before any sampling when the user solution is longer than the
    /// total collection size, repeats a gene or names an unknown gene.
    pub fn plan(
        &self,
        chains: usize,
        user_solution: &[String],
        rng: &mut RngHandle,
    ) -> Result<InitialPlan, CometError> {
        let total: usize = self.gene_set_sizes.iter().sum();
        let mut starts = Vec::with_capacity(chains);

        if !user_solution.is_empty() {
            self.check_user_genes(user_solution, total)?;
            if user_solution.len() == total {
                info!(genes = %user_solution.join(" "), "loaded initial solution");
                starts.push(user_solution.to_vec());
            } else {
                let padded = self.pad(user_solution, total, rng)?;
                info!(genes = %padded.join(" "), "loaded initial solution padded with random genes");
                starts.push(padded);
            }
        }

        if let Some(seeded) = self.seeded_start(total)? {
            starts.push(seeded);
        }

        if starts.len() > chains {
            warn!(planned = starts.len(), chains, "more starting solutions than chains; extra starts dropped");
            starts.truncate(chains);
        }
        starts.resize_with(chains, Vec::new);

        Ok(InitialPlan {
            starts,
            tables: (0..chains).map(|_| ChainTable::new()).collect(),
        })
    }

    fn check_user_genes(&self, user_solution: &[String], total: usize) -> Result<(), CometError> {
        if user_solution.len() > total {
            return Err(CometError::Config(
                ErrorInfo::new("initial-solution-size", "too many initial genes for the requested gene sets")
                    .with_context("given", user_solution.len().to_string())
                    .with_context("expected", total.to_string()),
            ));
        }
        let mut seen = BTreeSet::new();
        for gene in user_solution {
            if !self.dataset.contains_gene(gene) {
                return Err(CometError::Config(
                    ErrorInfo::new("initial-solution-gene", "initial gene is not in the mutation data")
                        .with_context("gene", gene.clone()),
                ));
            }
            if !seen.insert(gene.as_str()) {
                return Err(CometError::Config(
                    ErrorInfo::new("initial-solution-duplicate", "initial gene listed twice")
                        .with_context("gene", gene.clone()),
                ));
            }
        }
        Ok(())
    }

    fn pad(
        &self,
        user_solution: &[String],
        total: usize,
        rng: &mut RngHandle,
    ) -> Result<Vec<String>, CometError> {
        let chosen: BTreeSet<&str> = user_solution.iter().map(String::as_str).collect();
        let candidates: Vec<&String> = self
            .dataset
            .genes
            .iter()
            .filter(|gene| !chosen.contains(gene.as_str()))
            .collect();
        let deficit = total - user_solution.len();
        if candidates.len() < deficit {
            return Err(CometError::Config(
                ErrorInfo::new("initial-solution-pad", "not enough genes to pad the initial solution")
                    .with_context("needed", deficit.to_string())
                    .with_context("available", candidates.len().to_string()),
            ));
        }
        let mut padded = user_solution.to_vec();
        padded.extend(
            rng.distinct_indices(candidates.len(), deficit)
                .into_iter()
                .map(|position| candidates[position].clone()),
        );
        Ok(padded)
    }

    fn seeded_start(&self, total: usize) -> Result<Option<Vec<String>>, CometError> {
        let Some(seeder) = self.seeder else {
            info!("no initial-solution seeder available; using random initialisations");
            return Ok(None);
        };
        let Some(&size) = self.gene_set_sizes.first() else {
            return Ok(None);
        };
        if self.subtypes_active || self.gene_set_sizes.iter().any(|&k| k != size) {
            return Ok(None);
        }
        let params = SeederParams::uniform(self.gene_set_sizes.len(), size);
        let proposal = seeder.propose(self.dataset, &params)?;
        let flat: Vec<String> = proposal
            .iter()
            .flat_map(|(genes, _)| genes.iter().map(str::to_string))
            .collect();
        if flat.len() != total {
            return Err(CometError::Config(
                ErrorInfo::new("seeder-size", "seeded collection does not match the gene set sizes")
                    .with_context("seeder", seeder.name())
                    .with_context("given", flat.len().to_string())
                    .with_context("expected", total.to_string()),
            ));
        }
        info!(seeder = seeder.name(), genes = %flat.join(" "), "loaded seeded initial solution");
        Ok(Some(flat))
    }
}
