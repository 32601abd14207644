use std::fs::File;
use std::io::Read;
use std::path::Path;

use comet_core::errors::ErrorInfo;
use comet_core::{CometError, IndexedMutations, ScoreMethod};
use tracing::info;

use crate::engine::SamplingEngine;

const BASE_COLUMNS: usize = 3;
const SLOT_COLUMNS: usize = 3;

/// A set score read back from a previous results file.
#[derive(Debug, Clone, PartialEq)]
pub struct PrecomputedScore {
    /// Genes of the set.
    pub genes: Vec<String>,
    /// The `Phi` column.
    pub probability: f64,
    /// Test variant recorded for the set.
    pub method: ScoreMethod,
}

/// Parses every set score in a results TSV. The number of slots follows from
/// the column count.
pub fn parse_precomputed_scores<R: Read>(reader: R) -> Result<Vec<PrecomputedScore>, CometError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .from_reader(reader);
    let mut scores = Vec::new();
    for (line, record) in csv_reader.records().enumerate() {
        let row = line + 1;
        let record = record.map_err(|err| {
            CometError::Data(
                ErrorInfo::new("precomputed-parse", err.to_string())
                    .with_context("row", row.to_string()),
            )
        })?;
        if record.len() < BASE_COLUMNS + SLOT_COLUMNS
            || (record.len() - BASE_COLUMNS) % SLOT_COLUMNS != 0
        {
            return Err(CometError::Data(
                ErrorInfo::new("precomputed-columns", "unexpected column count in results file")
                    .with_context("row", row.to_string())
                    .with_context("columns", record.len().to_string()),
            ));
        }
        let slots = (record.len() - BASE_COLUMNS) / SLOT_COLUMNS;
        for slot in 0..slots {
            let base = BASE_COLUMNS + slot * SLOT_COLUMNS;
            let genes = record[base]
                .split(", ")
                .map(str::trim)
                .filter(|gene| !gene.is_empty())
                .map(str::to_string)
                .collect();
            let probability = record[base + 1].trim().parse::<f64>().map_err(|err| {
                CometError::Data(
                    ErrorInfo::new("precomputed-probability", err.to_string())
                        .with_context("row", row.to_string())
                        .with_context("value", &record[base + 1]),
                )
            })?;
            let method = ScoreMethod::parse(&record[base + 2])?;
            scores.push(PrecomputedScore {
                genes,
                probability,
                method,
            });
        }
    }
    Ok(scores)
}

/// Loads the scores in `path` into the engine cache. Returns the number of
/// set scores handed over.
pub fn load_precomputed_scores<E: SamplingEngine + ?Sized>(
    engine: &mut E,
    data: &IndexedMutations,
    path: &Path,
) -> Result<usize, CometError> {
    let file = File::open(path).map_err(|err| CometError::io("precomputed-open", path, err))?;
    let scores = parse_precomputed_scores(file)?;
    for score in &scores {
        let genes = data.indices_of(&score.genes)?;
        engine.load_precomputed_score(score.probability, genes.len(), score.method, &genes)?;
    }
    info!(path = %path.display(), scores = scores.len(), "loaded precomputed scores");
    Ok(scores.len())
}
