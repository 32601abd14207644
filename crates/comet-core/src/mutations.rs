//! Mutation matrix loading, filtering and conversion to the engine's indexed layout.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{CometError, ErrorInfo};

/// Binary gene-by-patient mutation data for one cohort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationDataset {
    /// Genes retained after filtering, sorted by name.
    pub genes: Vec<String>,
    /// Patients in first-appearance order.
    pub patients: Vec<String>,
    /// Patients carrying a mutation in each gene.
    pub gene_to_cases: BTreeMap<String, BTreeSet<String>>,
    /// Mutated genes carried by each patient.
    pub patient_to_genes: BTreeMap<String, BTreeSet<String>>,
}

impl MutationDataset {
    /// Number of genes (m).
    pub fn num_genes(&self) -> usize {
        self.genes.len()
    }

    /// Number of patients (n).
    pub fn num_patients(&self) -> usize {
        self.patients.len()
    }

    /// Returns whether the dataset contains the gene.
    pub fn contains_gene(&self, gene: &str) -> bool {
        self.gene_to_cases.contains_key(gene)
    }
}

/// Loads a tab-separated mutation matrix, applying optional whitelists and a
/// minimum gene mutation frequency.
pub fn load_mutation_data(
    matrix: &Path,
    patient_file: Option<&Path>,
    gene_file: Option<&Path>,
    min_freq: usize,
) -> Result<MutationDataset, CometError> {
    let patients = patient_file.map(read_name_list).transpose()?;
    let genes = gene_file.map(read_name_list).transpose()?;
    let file = File::open(matrix).map_err(|err| CometError::io("matrix-open", matrix, err))?;
    parse_mutation_data(file, patients.as_ref(), genes.as_ref(), min_freq).map_err(|err| {
        match err {
            CometError::Data(info) => {
                CometError::Data(info.with_context("path", matrix.display().to_string()))
            }
            other => other,
        }
    })
}

/// Parses mutation data from any reader.
///
/// Each line lists a patient followed by the genes mutated in that patient.
/// Lines starting with `#` are ignored. Patients on the whitelist are kept even
/// when none of their genes survive filtering.
pub fn parse_mutation_data<R: Read>(
    reader: R,
    patient_whitelist: Option<&BTreeSet<String>>,
    gene_whitelist: Option<&BTreeSet<String>>,
    min_freq: usize,
) -> Result<MutationDataset, CometError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut patients = Vec::new();
    let mut seen_patients = BTreeSet::new();
    let mut raw_patient_genes: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for (line, record) in csv_reader.records().enumerate() {
        let record = record.map_err(|err| {
            CometError::Data(
                ErrorInfo::new("matrix-parse", err.to_string())
                    .with_context("record", (line + 1).to_string()),
            )
        })?;
        let mut fields = record.iter().map(str::trim).filter(|field| !field.is_empty());
        let Some(patient) = fields.next() else {
            continue;
        };
        if let Some(whitelist) = patient_whitelist {
            if !whitelist.contains(patient) {
                continue;
            }
        }
        if seen_patients.insert(patient.to_string()) {
            patients.push(patient.to_string());
        }
        let entry = raw_patient_genes.entry(patient.to_string()).or_default();
        for gene in fields {
            if gene_whitelist.map_or(true, |whitelist| whitelist.contains(gene)) {
                entry.insert(gene.to_string());
            }
        }
    }

    let mut gene_to_cases: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for (patient, genes) in &raw_patient_genes {
        for gene in genes {
            gene_to_cases
                .entry(gene.clone())
                .or_default()
                .insert(patient.clone());
        }
    }
    gene_to_cases.retain(|_, cases| cases.len() >= min_freq);
    if gene_to_cases.is_empty() {
        return Err(CometError::Data(
            ErrorInfo::new("matrix-empty", "no genes left after filtering")
                .with_context("min_freq", min_freq.to_string())
                .with_hint("lower --min-freq or check the gene/patient filter files"),
        ));
    }

    let patient_to_genes = patients
        .iter()
        .map(|patient| {
            let genes = raw_patient_genes
                .get(patient)
                .map(|genes| {
                    genes
                        .iter()
                        .filter(|gene| gene_to_cases.contains_key(*gene))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();
            (patient.clone(), genes)
        })
        .collect();

    let genes: Vec<String> = gene_to_cases.keys().cloned().collect();
    debug!(genes = genes.len(), patients = patients.len(), "parsed mutation data");
    Ok(MutationDataset {
        genes,
        patients,
        gene_to_cases,
        patient_to_genes,
    })
}

/// Reads a newline separated list of names, keeping the first tab-separated column.
pub fn read_name_list(path: &Path) -> Result<BTreeSet<String>, CometError> {
    let contents =
        fs::read_to_string(path).map_err(|err| CometError::io("name-list-read", path, err))?;
    Ok(contents
        .lines()
        .filter(|line| !line.starts_with('#'))
        .filter_map(|line| line.split('\t').next())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect())
}

/// Reads an ordered list of names (one per line), preserving file order.
pub fn read_ordered_names(path: &Path) -> Result<Vec<String>, CometError> {
    let contents =
        fs::read_to_string(path).map_err(|err| CometError::io("name-list-read", path, err))?;
    Ok(contents
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Mutation data re-expressed with dense integer indices for the scoring engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedMutations {
    /// Gene name for each index.
    pub index_to_gene: Vec<String>,
    /// Index for each gene name.
    pub gene_to_index: HashMap<String, usize>,
    /// Gene indices mutated in each patient (patient order follows the dataset).
    pub patient_to_genes: Vec<Vec<usize>>,
    /// Patient indices carrying each gene.
    pub gene_cases: Vec<Vec<usize>>,
    /// Number of mutated patients per gene.
    pub gene_case_counts: Vec<usize>,
    /// Number of leading indices occupied by subtype pseudo-genes.
    pub subtype_count: usize,
}

impl IndexedMutations {
    /// Builds the indexed layout. Subtype labels present in the dataset take
    /// the first indices in the order given; all other genes follow sorted.
    pub fn from_dataset(dataset: &MutationDataset, subtypes: &[String]) -> Self {
        let mut index_to_gene = Vec::with_capacity(dataset.num_genes());
        let mut placed = BTreeSet::new();
        for subtype in subtypes {
            if !dataset.contains_gene(subtype) {
                warn!(subtype = %subtype, "subtype label not present in mutation data; ignored");
                continue;
            }
            if placed.insert(subtype.as_str()) {
                index_to_gene.push(subtype.clone());
            }
        }
        let subtype_count = index_to_gene.len();
        for gene in &dataset.genes {
            if !placed.contains(gene.as_str()) {
                index_to_gene.push(gene.clone());
            }
        }
        let gene_to_index: HashMap<String, usize> = index_to_gene
            .iter()
            .enumerate()
            .map(|(index, gene)| (gene.clone(), index))
            .collect();
        let patient_index: HashMap<&str, usize> = dataset
            .patients
            .iter()
            .enumerate()
            .map(|(index, patient)| (patient.as_str(), index))
            .collect();

        let patient_to_genes = dataset
            .patients
            .iter()
            .map(|patient| {
                let mut genes: Vec<usize> = dataset
                    .patient_to_genes
                    .get(patient)
                    .into_iter()
                    .flatten()
                    .filter_map(|gene| gene_to_index.get(gene).copied())
                    .collect();
                genes.sort_unstable();
                genes
            })
            .collect();
        let gene_cases: Vec<Vec<usize>> = index_to_gene
            .iter()
            .map(|gene| {
                let mut cases: Vec<usize> = dataset
                    .gene_to_cases
                    .get(gene)
                    .into_iter()
                    .flatten()
                    .filter_map(|patient| patient_index.get(patient.as_str()).copied())
                    .collect();
                cases.sort_unstable();
                cases
            })
            .collect();
        let gene_case_counts = gene_cases.iter().map(Vec::len).collect();

        Self {
            index_to_gene,
            gene_to_index,
            patient_to_genes,
            gene_cases,
            gene_case_counts,
            subtype_count,
        }
    }

    /// Number of genes (m).
    pub fn num_genes(&self) -> usize {
        self.index_to_gene.len()
    }

    /// Number of patients (n).
    pub fn num_patients(&self) -> usize {
        self.patient_to_genes.len()
    }

    /// Resolves gene names to indices, failing on the first unknown gene.
    pub fn indices_of(&self, genes: &[String]) -> Result<Vec<usize>, CometError> {
        genes
            .iter()
            .map(|gene| {
                self.gene_to_index.get(gene).copied().ok_or_else(|| {
                    CometError::Data(
                        ErrorInfo::new("unknown-gene", "gene is not present in the mutation data")
                            .with_context("gene", gene.clone()),
                    )
                })
            })
            .collect()
    }

    /// Returns the gene name for an index.
    pub fn gene_name(&self, index: usize) -> Option<&str> {
        self.index_to_gene.get(index).map(String::as_str)
    }
}
