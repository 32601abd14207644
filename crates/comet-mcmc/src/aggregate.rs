use std::fs::File;
use std::io::Write;
use std::path::Path;

use comet_core::errors::ErrorInfo;
use comet_core::CometError;

use crate::records::{GlobalTable, SetRecord};

/// One row of the final report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    /// Canonical key of the collection.
    pub key: String,
    /// Sampling frequency across all chains.
    pub frequency: u64,
    /// Sum of the set weights.
    pub total_weight: f64,
    /// Overflow-clamped target weight.
    pub target_weight: f64,
    /// Sets in ascending weight order.
    pub sets: Vec<SetRecord>,
}

/// Ranks the global table by descending total weight.
///
/// Ties keep the table's first-seen order; each row's sets are re-sorted by
/// ascending weight for display.
pub fn rank(table: &GlobalTable) -> Vec<ReportRow> {
    let mut rows: Vec<ReportRow> = table
        .iter()
        .map(|(key, record)| {
            let mut sets = record.sets.clone();
            sets.sort_by(|a, b| a.weight.total_cmp(&b.weight));
            ReportRow {
                key: key.to_string(),
                frequency: record.frequency,
                total_weight: record.total_weight,
                target_weight: record.target_weight,
                sets,
            }
        })
        .collect();
    rows.sort_by(|a, b| b.total_weight.total_cmp(&a.total_weight));
    rows
}

/// Header fields for a report over slots of the given sizes.
pub fn header(gene_set_sizes: &[usize]) -> Vec<String> {
    let mut fields = vec![
        "#Freq".to_string(),
        "Total Weight".to_string(),
        "Target Weight".to_string(),
    ];
    for (index, size) in gene_set_sizes.iter().enumerate() {
        let slot = index + 1;
        fields.push(format!("Gene set {slot} (k={size})"));
        fields.push(format!("Phi {slot}"));
        fields.push(format!("Weight function {slot}"));
    }
    fields
}

/// Writes the ranked rows as a tab-separated report.
pub fn write_report<W: Write>(
    writer: W,
    gene_set_sizes: &[usize],
    rows: &[ReportRow],
) -> Result<(), CometError> {
    let mut out = tsv_writer(writer);
    out.write_record(header(gene_set_sizes)).map_err(csv_error)?;
    for row in rows {
        let mut fields = vec![
            row.frequency.to_string(),
            format!("{:?}", row.total_weight),
            format_general(row.target_weight),
        ];
        for set in &row.sets {
            fields.push(set.genes.join(", "));
            fields.push(format!("{:?}", set.probability));
            fields.push(set.method.label().to_string());
        }
        out.write_record(&fields).map_err(csv_error)?;
    }
    out.flush()
        .map_err(|err| CometError::Io(ErrorInfo::new("report-flush", err.to_string())))
}

/// Writes the report to `path`.
pub fn write_report_file(
    path: &Path,
    gene_set_sizes: &[usize],
    rows: &[ReportRow],
) -> Result<(), CometError> {
    let file = File::create(path).map_err(|err| CometError::io("report-create", path, err))?;
    write_report(file, gene_set_sizes, rows).map_err(|err| match err {
        CometError::Io(info) => {
            CometError::Io(info.with_context("path", path.display().to_string()))
        }
        other => other,
    })
}

pub(crate) fn tsv_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Never)
        .flexible(true)
        .from_writer(writer)
}

pub(crate) fn csv_error(err: csv::Error) -> CometError {
    CometError::Io(ErrorInfo::new("tsv-write", err.to_string()))
}

/// Renders a float like C's `%g`: six significant digits, trailing zeros
/// removed, scientific notation outside `1e-4 <= |v| < 1e6`.
pub fn format_general(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }
    let scientific = format!("{value:.5e}");
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    if !(-4..6).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", trim_fraction(mantissa), exponent.abs())
    } else {
        let decimals = (5 - exponent) as usize;
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    }
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}
