use comet_core::errors::ErrorInfo;
use comet_core::{CometError, GeneSet, ScoreMethod};

use crate::engine::{RawRow, RawSample};
use crate::records::SetRecord;

/// Probability implied by a weight: `exp(-weight / amplifier)`.
pub fn probability(weight: f64, amplifier: u32) -> f64 {
    (-weight / f64::from(amplifier)).exp()
}

/// Turns raw engine samples into named, scored gene sets.
#[derive(Debug, Clone, Copy)]
pub struct SolutionConverter<'a> {
    index_to_gene: &'a [String],
    amplifier: u32,
}

impl<'a> SolutionConverter<'a> {
    /// Creates a converter over the engine's index-to-gene table.
    pub fn new(index_to_gene: &'a [String], amplifier: u32) -> Self {
        Self {
            index_to_gene,
            amplifier,
        }
    }

    /// Converts a sample into set records sorted by descending weight.
    ///
    /// The sort is stable: sets with equal weights keep emission order.
    pub fn convert(&self, sample: &RawSample) -> Result<Vec<SetRecord>, CometError> {
        let mut sets = sample
            .rows
            .iter()
            .map(|row| {
                Ok(SetRecord {
                    genes: GeneSet::new(self.names(row)?),
                    weight: row.weight,
                    method: ScoreMethod::from_code(row.table_count)?,
                    probability: probability(row.weight, self.amplifier),
                })
            })
            .collect::<Result<Vec<_>, CometError>>()?;
        sets.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        Ok(sets)
    }

    /// Flattens a sample into a warm-start gene list, keeping engine slot
    /// order so each slot keeps its configured size. Genes within a slot are
    /// listed by name.
    pub fn warm_start(&self, sample: &RawSample) -> Result<Vec<String>, CometError> {
        let mut flat = Vec::new();
        for row in &sample.rows {
            let mut names = self.names(row)?;
            names.sort();
            flat.extend(names);
        }
        Ok(flat)
    }

    fn names(&self, row: &RawRow) -> Result<Vec<String>, CometError> {
        row.genes
            .iter()
            .map(|&index| {
                self.index_to_gene.get(index).cloned().ok_or_else(|| {
                    CometError::Engine(
                        ErrorInfo::new("gene-index", "engine emitted an unknown gene index")
                            .with_context("index", index.to_string())
                            .with_context("genes", self.index_to_gene.len().to_string()),
                    )
                })
            })
            .collect()
    }
}
