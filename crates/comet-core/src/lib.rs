#![deny(missing_docs)]
#![doc = "Core types for the CoMEt driver: gene sets, mutation data, weight tags and the shared error surface."]

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

pub mod errors;
pub mod mutations;
pub mod provenance;
pub mod rng;
mod weights;

pub use errors::{CometError, ErrorInfo};
pub use mutations::{load_mutation_data, IndexedMutations, MutationDataset};
pub use provenance::{RunProvenance, SchemaVersion};
pub use rng::{derive_substream_seed, RngHandle};
pub use weights::{ScoreMethod, WeightFunction};

/// Unordered set of gene identifiers occupying one pathway slot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct GeneSet(BTreeSet<String>);

impl GeneSet {
    /// Builds a set from any iterator of gene names.
    pub fn new<I, S>(genes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(genes.into_iter().map(Into::into).collect())
    }

    /// Number of genes in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the genes in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(String::as_str)
    }

    /// Returns whether the set contains the gene.
    pub fn contains(&self, gene: &str) -> bool {
        self.0.contains(gene)
    }

    /// Joins the sorted genes with `separator`.
    pub fn join(&self, separator: &str) -> String {
        self.iter().collect::<Vec<_>>().join(separator)
    }
}

impl fmt::Display for GeneSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.join(", "))
    }
}

impl<S: Into<String>> FromIterator<S> for GeneSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}
