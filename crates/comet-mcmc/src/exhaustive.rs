use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use comet_core::errors::ErrorInfo;
use comet_core::{CometError, GeneSet, IndexedMutations, ScoreMethod, WeightFunction};
use tracing::info;

use crate::aggregate::{csv_error, tsv_writer};
use crate::config::ExhaustiveConfig;
use crate::context::ComputationContext;
use crate::engine::{EnumeratedSet, SamplingEngine};

/// Probability the engine assigns to sets it could not test.
pub const INVALID_PROBABILITY: f64 = -1.0;

/// A valid, named result of exhaustive enumeration.
#[derive(Debug, Clone, PartialEq)]
pub struct ExhaustiveRow {
    /// Genes in the set.
    pub genes: GeneSet,
    /// P-value of the set.
    pub probability: f64,
    /// Weight of the set.
    pub weight: f64,
    /// Test variant that scored the set.
    pub method: ScoreMethod,
}

/// Drops untestable sets and sorts the rest by descending weight (stable).
pub fn filter_enumeration(
    data: &IndexedMutations,
    sets: Vec<EnumeratedSet>,
) -> Result<Vec<ExhaustiveRow>, CometError> {
    let mut rows = Vec::with_capacity(sets.len());
    for set in sets {
        if set.probability == INVALID_PROBABILITY {
            continue;
        }
        let names = set
            .genes
            .iter()
            .map(|&index| {
                data.gene_name(index).ok_or_else(|| {
                    CometError::Engine(
                        ErrorInfo::new("gene-index", "engine emitted an unknown gene index")
                            .with_context("index", index.to_string()),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(ExhaustiveRow {
            genes: GeneSet::new(names),
            probability: set.probability,
            weight: set.weight,
            method: ScoreMethod::from_code(set.table_count)?,
        });
    }
    rows.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    Ok(rows)
}

/// Enumerates and filters every set of the configured size.
pub fn run_exhaustive<E: SamplingEngine + ?Sized>(
    engine: &mut E,
    ctx: &mut ComputationContext,
    data: &IndexedMutations,
    config: &ExhaustiveConfig,
) -> Result<Vec<ExhaustiveRow>, CometError> {
    engine.set_weight_function(config.weight_function)?;
    let enumerated =
        engine.enumerate_exhaustive(ctx, data, config.gene_set_size, config.pval_threshold)?;
    let total = enumerated.len();
    let rows = filter_enumeration(data, enumerated)?;
    info!(
        k = config.gene_set_size,
        enumerated = total,
        kept = rows.len(),
        "exhaustive enumeration finished"
    );
    Ok(rows)
}

/// Output path `<prefix>-k<k>-<weight function>-exhaustive.tsv`.
pub fn output_path(prefix: &str, gene_set_size: usize, function: WeightFunction) -> PathBuf {
    PathBuf::from(format!(
        "{prefix}-k{gene_set_size}-{}-exhaustive.tsv",
        function.name()
    ))
}

/// Writes the rows: gene list, p-value and weight per line.
pub fn write_exhaustive<W: Write>(writer: W, rows: &[ExhaustiveRow]) -> Result<(), CometError> {
    let mut out = tsv_writer(writer);
    out.write_record(["#Gene set", "P-value", "Freq", "Weight"])
        .map_err(csv_error)?;
    for row in rows {
        out.write_record([
            row.genes.join(", "),
            format!("{:?}", row.probability),
            format!("{:?}", row.weight),
        ])
        .map_err(csv_error)?;
    }
    out.flush()
        .map_err(|err| CometError::Io(ErrorInfo::new("exhaustive-flush", err.to_string())))
}

/// Writes the rows to `path`.
pub fn write_exhaustive_file(path: &Path, rows: &[ExhaustiveRow]) -> Result<(), CometError> {
    let file = File::create(path).map_err(|err| CometError::io("exhaustive-create", path, err))?;
    write_exhaustive(file, rows)
}
