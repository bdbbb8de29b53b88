//! Shared fixtures for multiomix tests.
//!
//! Builders for raw and filtered omics tables, the canonical TP53 scenario,
//! and a mock enrichment client preloaded with scenario terms.

use std::path::{Path, PathBuf};

use anyhow::Context;

use multiomix_common::pipeline_config::default_libraries;
use multiomix_common::{
    EnrichmentRecord, FilteredTable, LibrarySpec, MeasurementRow, OmicsSource, RawTable, TermCategory,
};
use multiomix_enrichment::MockEnrichmentClient;

// ── Raw tables ────────────────────────────────────────────────────────────────

pub fn raw_table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
    RawTable {
        headers: headers.iter().map(|h| h.to_string()).collect(),
        rows: rows.iter().map(|r| r.iter().map(|c| c.to_string()).collect()).collect(),
    }
}

/// `Gene, CADD` table.
pub fn genomics_raw(rows: &[(&str, &str)]) -> RawTable {
    two_column("CADD", rows)
}

/// `Gene, TPM` table.
pub fn transcriptomics_raw(rows: &[(&str, &str)]) -> RawTable {
    two_column("TPM", rows)
}

/// `Gene, Protein, Intensity` table.
pub fn proteomics_raw(rows: &[(&str, &str, &str)]) -> RawTable {
    RawTable {
        headers: vec!["Gene".into(), "Protein".into(), "Intensity".into()],
        rows: rows
            .iter()
            .map(|(g, p, i)| vec![g.to_string(), p.to_string(), i.to_string()])
            .collect(),
    }
}

fn two_column(value_column: &str, rows: &[(&str, &str)]) -> RawTable {
    RawTable {
        headers: vec!["Gene".into(), value_column.to_string()],
        rows: rows.iter().map(|(g, v)| vec![g.to_string(), v.to_string()]).collect(),
    }
}

/// Write a raw table as `<dir>/<name>` and return its path.
pub fn write_csv(dir: &Path, name: &str, table: &RawTable) -> anyhow::Result<PathBuf> {
    let path = dir.join(name);
    let mut wtr = csv::Writer::from_path(&path).with_context(|| format!("creating {}", path.display()))?;
    wtr.write_record(&table.headers)?;
    for row in &table.rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(path)
}

// ── Filtered tables ───────────────────────────────────────────────────────────

/// Filtered table whose rows carry only a gene and a passing value.
pub fn filtered_genes(source: OmicsSource, genes: &[&str]) -> FilteredTable {
    FilteredTable {
        source,
        column: source.numeric_column().to_string(),
        threshold: 0.0,
        headers: vec!["Gene".into(), source.numeric_column().to_string()],
        rows: genes
            .iter()
            .map(|g| MeasurementRow {
                gene: g.to_string(),
                protein: None,
                value: Some(1.0),
                cells: vec![g.to_string(), "1".into()],
            })
            .collect(),
        coerced_missing: 0,
        total_rows: genes.len(),
    }
}

/// Filtered proteomics table from `(gene, protein)` pairs.
pub fn filtered_proteomics(rows: &[(&str, &str)]) -> FilteredTable {
    FilteredTable {
        source: OmicsSource::Proteomics,
        column: "Intensity".into(),
        threshold: 1000.0,
        headers: vec!["Gene".into(), "Protein".into(), "Intensity".into()],
        rows: rows
            .iter()
            .map(|(g, p)| MeasurementRow {
                gene: g.to_string(),
                protein: Some(p.to_string()),
                value: Some(2000.0),
                cells: vec![g.to_string(), p.to_string(), "2000".into()],
            })
            .collect(),
        coerced_missing: 0,
        total_rows: rows.len(),
    }
}

// ── Scenarios ─────────────────────────────────────────────────────────────────

/// The three raw inputs of one scenario.
#[derive(Debug, Clone)]
pub struct ScenarioTables {
    pub genomics: RawTable,
    pub transcriptomics: RawTable,
    pub proteomics: RawTable,
}

/// TP53 passes every default threshold; BRCA1 fails the CADD cut.
pub fn tp53_scenario() -> ScenarioTables {
    ScenarioTables {
        genomics: genomics_raw(&[("TP53", "25"), ("BRCA1", "10")]),
        transcriptomics: transcriptomics_raw(&[("TP53", "5")]),
        proteomics: proteomics_raw(&[("TP53", "P53_HUMAN", "2000")]),
    }
}

/// Three tables with no gene in common.
pub fn disjoint_scenario() -> ScenarioTables {
    ScenarioTables {
        genomics: genomics_raw(&[("TP53", "30")]),
        transcriptomics: transcriptomics_raw(&[("KRAS", "12")]),
        proteomics: proteomics_raw(&[("EGFR", "EGFR_HUMAN", "5000")]),
    }
}

pub fn library(category: TermCategory) -> LibrarySpec {
    default_libraries()
        .into_iter()
        .find(|l| l.category == category)
        .unwrap_or_else(|| LibrarySpec::new(category.as_str(), category.as_str(), category))
}

/// `Apoptosis` with members `TP53;BRCA1`.
pub fn apoptosis_record() -> EnrichmentRecord {
    EnrichmentRecord::from_delimited("Apoptosis", "TP53;BRCA1", 42.0)
}

/// Mock client returning Apoptosis for pathways, one disease and one
/// metabolite term for TP53.
pub fn scenario_client() -> MockEnrichmentClient {
    MockEnrichmentClient::new()
        .with_records(&library(TermCategory::Pathway).library_id, vec![apoptosis_record()])
        .with_records(
            &library(TermCategory::Disease).library_id,
            vec![EnrichmentRecord::from_delimited("Li-Fraumeni syndrome", "TP53", 55.0)],
        )
        .with_records(
            &library(TermCategory::Metabolite).library_id,
            vec![EnrichmentRecord::from_delimited("NADH", "TP53", 3.5)],
        )
}
