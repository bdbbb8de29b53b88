//! Core entity types shared by the ingestion, enrichment and graph crates.
//! Every value here is an immutable artifact of one pipeline run.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Omics sources
// ---------------------------------------------------------------------------

/// One measurement modality keyed by gene.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum OmicsSource {
    Genomics,
    Transcriptomics,
    Proteomics,
}

pub const GENE_COLUMN: &str = "Gene";
pub const PROTEIN_COLUMN: &str = "Protein";

impl OmicsSource {
    pub const ALL: [OmicsSource; 3] = [
        OmicsSource::Genomics,
        OmicsSource::Transcriptomics,
        OmicsSource::Proteomics,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OmicsSource::Genomics        => "genomics",
            OmicsSource::Transcriptomics => "transcriptomics",
            OmicsSource::Proteomics      => "proteomics",
        }
    }

    /// Name of the numeric column the threshold applies to.
    pub fn numeric_column(&self) -> &'static str {
        match self {
            OmicsSource::Genomics        => "CADD",
            OmicsSource::Transcriptomics => "TPM",
            OmicsSource::Proteomics      => "Intensity",
        }
    }

    /// Columns that must be present for the table to be usable.
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            OmicsSource::Genomics        => &[GENE_COLUMN, "CADD"],
            OmicsSource::Transcriptomics => &[GENE_COLUMN, "TPM"],
            OmicsSource::Proteomics      => &[GENE_COLUMN, PROTEIN_COLUMN, "Intensity"],
        }
    }
}

impl std::fmt::Display for OmicsSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// Untyped table as delivered by the CSV loader: headers plus string cells.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }
}

/// One typed record of an omics table.
///
/// `cells` keeps every original value in the original column order, so a
/// filtered table can still be previewed with all of its columns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeasurementRow {
    pub gene: String,
    pub protein: Option<String>,
    /// The source's measurement (`CADD`, `TPM` or `Intensity`); `None` when the
    /// cell did not parse as a number.
    pub value: Option<f64>,
    pub cells: Vec<String>,
}

/// A schema-validated omics table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeasurementTable {
    pub source: OmicsSource,
    pub headers: Vec<String>,
    pub rows: Vec<MeasurementRow>,
}

impl MeasurementTable {
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Rows of a [`MeasurementTable`] whose numeric column is present and at or
/// above the threshold, in original order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilteredTable {
    pub source: OmicsSource,
    pub column: String,
    pub threshold: f64,
    pub headers: Vec<String>,
    pub rows: Vec<MeasurementRow>,
    /// Rows dropped because the numeric cell was missing or unparseable.
    pub coerced_missing: usize,
    /// Row count of the table before filtering.
    pub total_rows: usize,
}

impl FilteredTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First `n` rows, for display.
    pub fn preview(&self, n: usize) -> &[MeasurementRow] {
        &self.rows[..n.min(self.rows.len())]
    }

    /// Distinct gene identifiers of the retained rows.
    pub fn genes(&self) -> GeneSet {
        self.rows.iter().map(|r| r.gene.as_str()).collect()
    }
}

/// Parse a cell as a number; anything unparseable (including `NaN`) is missing.
pub fn coerce_numeric(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

// ---------------------------------------------------------------------------
// Gene set
// ---------------------------------------------------------------------------

/// Deduplicated, lexicographically ordered set of gene identifiers.
/// Empty identifiers are never inserted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct GeneSet(BTreeSet<String>);

impl GeneSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, gene: impl Into<String>) -> bool {
        let gene = gene.into();
        if gene.is_empty() {
            return false;
        }
        self.0.insert(gene)
    }

    pub fn contains(&self, gene: &str) -> bool {
        self.0.contains(gene)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    pub fn intersection(&self, other: &GeneSet) -> GeneSet {
        GeneSet(self.0.intersection(&other.0).cloned().collect())
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

impl<'a> FromIterator<&'a str> for GeneSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = GeneSet::new();
        for gene in iter {
            set.insert(gene);
        }
        set
    }
}

impl FromIterator<String> for GeneSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = GeneSet::new();
        for gene in iter {
            set.insert(gene);
        }
        set
    }
}

impl<'a> IntoIterator for &'a GeneSet {
    type Item = &'a String;
    type IntoIter = std::collections::btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ---------------------------------------------------------------------------
// Enrichment
// ---------------------------------------------------------------------------

/// Which annotation category a library's terms belong to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum TermCategory {
    Pathway,
    Metabolite,
    Disease,
}

impl TermCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TermCategory::Pathway    => "pathway",
            TermCategory::Metabolite => "metabolite",
            TermCategory::Disease    => "disease",
        }
    }
}

/// A configured enrichment library: display name, backing library id and category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LibrarySpec {
    /// Display name, e.g. "Reactome Pathways". Results are keyed by it.
    pub name: String,
    /// Backing library id understood by the service, e.g. "Reactome_2016".
    pub library_id: String,
    pub category: TermCategory,
}

impl LibrarySpec {
    pub fn new(name: &str, library_id: &str, category: TermCategory) -> Self {
        Self {
            name: name.to_string(),
            library_id: library_id.to_string(),
            category,
        }
    }
}

/// One enriched term returned by a library query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrichmentRecord {
    pub term: String,
    /// Atomic gene identifiers of the term's overlap with the query list.
    pub member_genes: Vec<String>,
    pub combined_score: f64,
    pub rank: Option<u32>,
    pub p_value: Option<f64>,
    pub adjusted_p_value: Option<f64>,
    pub z_score: Option<f64>,
}

impl EnrichmentRecord {
    /// Build a record from a `;`-delimited member gene string.
    pub fn from_delimited(term: &str, genes: &str, combined_score: f64) -> Self {
        Self {
            term: term.to_string(),
            member_genes: split_member_genes(genes),
            combined_score,
            rank: None,
            p_value: None,
            adjusted_p_value: None,
            z_score: None,
        }
    }
}

/// Results of one library query, in service rank order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrichmentTable {
    pub library: LibrarySpec,
    pub records: Vec<EnrichmentRecord>,
}

impl EnrichmentTable {
    pub fn empty(library: LibrarySpec) -> Self {
        Self { library, records: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// The `n` best-ranked records.
    pub fn top(&self, n: usize) -> &[EnrichmentRecord] {
        &self.records[..n.min(self.records.len())]
    }
}

/// Split a `;`-delimited gene list into trimmed, non-empty identifiers.
pub fn split_member_genes(genes: &str) -> Vec<String> {
    genes
        .split(';')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(String::from)
        .collect()
}
