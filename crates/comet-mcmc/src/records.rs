use comet_core::{GeneSet, ScoreMethod};
use indexmap::IndexMap;

use crate::canonical::CanonicalKey;

/// Total weights at or above this value saturate the target weight.
pub const OVERFLOW_THRESHOLD: f64 = 700.0;

/// Target weight reported for saturated totals.
pub const SATURATED_TARGET_WEIGHT: f64 = f64::INFINITY;

/// Returns `exp(total_weight)`, or the saturation sentinel when
/// `total_weight >= 700`.
pub fn target_weight(total_weight: f64) -> f64 {
    if total_weight < OVERFLOW_THRESHOLD {
        total_weight.exp()
    } else {
        SATURATED_TARGET_WEIGHT
    }
}

/// One scored gene set within a sampled collection.
#[derive(Debug, Clone, PartialEq)]
pub struct SetRecord {
    /// Genes in the set.
    pub genes: GeneSet,
    /// Engine weight (negative log-scale score).
    pub weight: f64,
    /// Test variant that produced the weight.
    pub method: ScoreMethod,
    /// `exp(-weight / amplifier)`.
    pub probability: f64,
}

/// Aggregated sampling record for one distinct collection.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    /// Times the collection was sampled.
    pub frequency: u64,
    /// Per-slot breakdown in converter order (descending weight).
    pub sets: Vec<SetRecord>,
    /// Sum of the set weights.
    pub total_weight: f64,
    /// Overflow-clamped `exp(total_weight)`.
    pub target_weight: f64,
}

impl ResultRecord {
    /// Creates a first-sighting record with frequency 1.
    pub fn first_sighting(sets: Vec<SetRecord>) -> Self {
        let total_weight = sets.iter().map(|set| set.weight).sum();
        Self {
            frequency: 1,
            sets,
            total_weight,
            target_weight: target_weight(total_weight),
        }
    }
}

/// Per-chain frequency table. Iteration follows first insertion.
pub type ChainTable = IndexMap<CanonicalKey, ResultRecord>;

/// Union of all chain tables, built once for reporting.
pub type GlobalTable = ChainTable;

/// Folds one converted sample into a table. Returns `true` for a new key.
pub fn fold_sample(table: &mut ChainTable, sets: Vec<SetRecord>) -> bool {
    let key = CanonicalKey::from_sets(sets.iter().map(|set| &set.genes));
    match table.get_mut(&key) {
        Some(record) => {
            record.frequency += 1;
            false
        }
        None => {
            table.insert(key, ResultRecord::first_sighting(sets));
            true
        }
    }
}

/// Adds `other` into `target`: frequencies sum, existing content is kept.
pub fn merge_into(target: &mut ChainTable, other: &ChainTable) {
    for (key, record) in other {
        match target.get_mut(key) {
            Some(existing) => existing.frequency += record.frequency,
            None => {
                target.insert(key.clone(), record.clone());
            }
        }
    }
}

/// Merges chain tables into the global table; first-seen content wins.
pub fn merge_tables<'a, I>(tables: I) -> GlobalTable
where
    I: IntoIterator<Item = &'a ChainTable>,
{
    let mut global = GlobalTable::new();
    for table in tables {
        merge_into(&mut global, table);
    }
    global
}
