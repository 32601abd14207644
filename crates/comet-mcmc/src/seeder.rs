use comet_core::{CometError, GeneSet, MutationDataset};

/// Parameters handed to an initial-solution seeder.
#[derive(Debug, Clone, PartialEq)]
pub struct SeederParams {
    /// Number of gene sets to propose.
    pub pathways: usize,
    /// Smallest allowed set size.
    pub min_size: usize,
    /// Largest allowed set size.
    pub max_size: usize,
    /// Coverage/exclusivity trade-off.
    pub alpha: f64,
    /// Minimum number of edges between sets.
    pub delta: usize,
    /// Maximum number of sets a gene may belong to.
    pub lambda: usize,
}

impl SeederParams {
    /// Parameters for `pathways` sets of exactly `size` genes, with the
    /// seeder's customary defaults (alpha 1.0, delta 0, lambda 1).
    pub fn uniform(pathways: usize, size: usize) -> Self {
        Self {
            pathways,
            min_size: size,
            max_size: size,
            alpha: 1.0,
            delta: 0,
            lambda: 1,
        }
    }
}

/// Optional proposer of high-quality starting collections (an ILP solver, say).
pub trait InitialSeeder {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Proposes gene sets with their weights.
    fn propose(
        &self,
        dataset: &MutationDataset,
        params: &SeederParams,
    ) -> Result<Vec<(GeneSet, f64)>, CometError>;
}
