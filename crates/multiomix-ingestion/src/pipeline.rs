//! End-to-end integration pipeline.
//!
//! Orchestrates one run over three omics tables:
//!   1. Validate each table's schema and type its rows
//!   2. Apply the per-source threshold filter
//!   3. Resolve the genes common to all three filtered tables
//!   4. Query every enrichment library (concurrent, isolated, with timeout)
//!   5. Assemble the gene / protein / term network
//!   6. Roll up associations per common gene
//!   7. Emit progress events via broadcast channel
//!
//! The pipeline is non-destructive: a failure local to one table or one
//! library is recorded in the report and the run continues with what it has.

use std::path::Path;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use multiomix_common::pipeline_config::InputConfig;
use multiomix_common::{
    FilteredTable, GeneSet, MultiomixError, OmicsSource, PipelineConfig, RawTable, Result,
};
use multiomix_enrichment::{query_libraries, EnrichmentClient, EnrichmentResults, LibraryOutcome};
use multiomix_kg::{aggregate, assemble, AssemblyOptions, AssociationRow, Graph};

use crate::common_set;
use crate::filter::filter_source;
use crate::loader::load_csv;
use crate::schema::validate_table;

// ── Inputs ────────────────────────────────────────────────────────────────────

/// The three raw tables of one run.
#[derive(Debug, Clone, Default)]
pub struct OmicsInputs {
    pub genomics: RawTable,
    pub transcriptomics: RawTable,
    pub proteomics: RawTable,
}

impl OmicsInputs {
    pub fn get(&self, source: OmicsSource) -> &RawTable {
        match source {
            OmicsSource::Genomics        => &self.genomics,
            OmicsSource::Transcriptomics => &self.transcriptomics,
            OmicsSource::Proteomics      => &self.proteomics,
        }
    }

    /// Load the three CSV files named in the `[inputs]` config section.
    pub fn load(inputs: &InputConfig) -> Result<Self> {
        let path = |source: OmicsSource| {
            inputs.path_for(source).ok_or_else(|| {
                MultiomixError::Config(format!("no input file configured for {source}"))
            })
        };
        Ok(Self {
            genomics: load_csv(Path::new(path(OmicsSource::Genomics)?))?,
            transcriptomics: load_csv(Path::new(path(OmicsSource::Transcriptomics)?))?,
            proteomics: load_csv(Path::new(path(OmicsSource::Proteomics)?))?,
        })
    }
}

// ── Progress events ───────────────────────────────────────────────────────────

/// Progress event emitted during a run (cloneable for broadcast).
#[derive(Debug, Clone, Serialize)]
pub struct IntegrationProgress {
    pub run_id: Uuid,
    pub stage: String,
    pub message: String,
    pub common_genes: usize,
    pub libraries_done: usize,
    pub error: Option<String>,
}

impl IntegrationProgress {
    fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            stage: String::new(),
            message: String::new(),
            common_genes: 0,
            libraries_done: 0,
            error: None,
        }
    }
}

// ── Notices ───────────────────────────────────────────────────────────────────

/// Non-fatal conditions surfaced to the user alongside the results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineNotice {
    /// A table lacks a required column and was rejected.
    SchemaError { table: String, column: String },
    /// Values in a table's measurement column could not be parsed.
    CoercedValues { table: OmicsSource, column: String, rows: usize },
    /// No gene passed all three filters.
    EmptyIntersection,
    /// Enrichment was turned off for this run.
    EnrichmentDisabled,
    LibraryEmpty { library: String },
    LibraryFailed { library: String, reason: String },
}

impl PipelineNotice {
    pub fn message(&self) -> String {
        match self {
            PipelineNotice::SchemaError { table, column } => {
                format!("The {table} table is missing the required column '{column}'.")
            }
            PipelineNotice::CoercedValues { table, column, rows } => {
                format!("{rows} {table} row(s) had a non-numeric {column} value and were excluded.")
            }
            PipelineNotice::EmptyIntersection => {
                "No common genes passed all three thresholds; try lowering the thresholds.".to_string()
            }
            PipelineNotice::EnrichmentDisabled => "Enrichment analysis was skipped.".to_string(),
            PipelineNotice::LibraryEmpty { library } => format!("No enriched terms in {library}."),
            PipelineNotice::LibraryFailed { library, reason } => {
                format!("Enrichment against {library} failed: {reason}")
            }
        }
    }
}

// ── Result summary ────────────────────────────────────────────────────────────

/// Head of one filtered table, for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TablePreview {
    pub source: OmicsSource,
    pub column: String,
    pub threshold: f64,
    pub total_rows: usize,
    pub kept_rows: usize,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TablePreview {
    pub fn from_filtered(table: &FilteredTable, n: usize) -> Self {
        Self {
            source: table.source,
            column: table.column.clone(),
            threshold: table.threshold,
            total_rows: table.total_rows,
            kept_rows: table.len(),
            headers: table.headers.clone(),
            rows: table.preview(n).iter().map(|r| r.cells.clone()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IntegrationReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    /// Previews of every table that passed validation.
    pub previews: Vec<TablePreview>,
    /// `None` when a table was rejected.
    pub common_genes: Option<GeneSet>,
    /// `None` when enrichment did not run.
    pub enrichment: Option<EnrichmentResults>,
    pub graph: Option<Graph>,
    pub associations: Option<Vec<AssociationRow>>,
    pub notices: Vec<PipelineNotice>,
    pub errors: Vec<String>,
}

impl IntegrationReport {
    fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            started_at: Utc::now(),
            duration_ms: 0,
            previews: Vec::new(),
            common_genes: None,
            enrichment: None,
            graph: None,
            associations: None,
            notices: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn preview(&self, source: OmicsSource) -> Option<&TablePreview> {
        self.previews.iter().find(|p| p.source == source)
    }

    pub fn has_notice(&self, notice: &PipelineNotice) -> bool {
        self.notices.contains(notice)
    }
}

// ── Pipeline orchestrator ─────────────────────────────────────────────────────

/// Runs the integration pipeline for one set of tables.
///
/// Progress events are sent via `progress_tx` if provided.
#[instrument(skip_all)]
pub async fn run_integration(
    inputs: &OmicsInputs,
    config: &PipelineConfig,
    client: &dyn EnrichmentClient,
    progress_tx: Option<broadcast::Sender<IntegrationProgress>>,
) -> IntegrationReport {
    let run_id = Uuid::new_v4();
    let t0 = Instant::now();
    let mut report = IntegrationReport::new(run_id);
    info!(run_id = %run_id, "Starting integration pipeline");

    let emit = |stage: &str, msg: &str, mut prog: IntegrationProgress| {
        prog.stage = stage.to_string();
        prog.message = msg.to_string();
        if let Some(ref tx) = progress_tx {
            let _ = tx.send(prog);
        }
    };
    let prog_base = IntegrationProgress::new(run_id);

    // ── 1-2. Validate and filter each table ──────────────────────────────────
    emit("filter", "Validating and filtering input tables", prog_base.clone());

    let mut filtered: Vec<FilteredTable> = Vec::with_capacity(OmicsSource::ALL.len());
    for source in OmicsSource::ALL {
        let outcome = validate_table(source, inputs.get(source))
            .and_then(|table| filter_source(&table, &config.thresholds));

        match outcome {
            Ok(table) => {
                info!(
                    table = %source,
                    kept = table.len(),
                    total = table.total_rows,
                    threshold = table.threshold,
                    "Table filtered"
                );
                if table.coerced_missing > 0 {
                    report.notices.push(PipelineNotice::CoercedValues {
                        table: source,
                        column: table.column.clone(),
                        rows: table.coerced_missing,
                    });
                }
                report.previews.push(TablePreview::from_filtered(&table, config.display.preview_row_count));
                filtered.push(table);
            }
            Err(e) => {
                warn!(table = %source, error = %e, "Table rejected");
                if let MultiomixError::Schema { table, column } = &e {
                    report.notices.push(PipelineNotice::SchemaError {
                        table: table.clone(),
                        column: column.clone(),
                    });
                }
                report.errors.push(e.to_string());
            }
        }
    }

    let [genomics, transcriptomics, proteomics] = match <[FilteredTable; 3]>::try_from(filtered) {
        Ok(tables) => tables,
        Err(_) => {
            let mut p = prog_base.clone();
            p.error = report.errors.first().cloned();
            emit("failed", "One or more input tables were rejected", p);
            return finish(report, t0);
        }
    };

    // ── 3. Common gene set ───────────────────────────────────────────────────
    let common = common_set::resolve(&genomics, &transcriptomics, &proteomics);
    let mut prog = prog_base.clone();
    prog.common_genes = common.len();
    emit("intersect", &format!("{} common genes", common.len()), prog.clone());

    if common.is_empty() {
        report.notices.push(PipelineNotice::EmptyIntersection);
    }

    // ── 4. Enrichment ────────────────────────────────────────────────────────
    if !config.display.run_enrichment {
        report.notices.push(PipelineNotice::EnrichmentDisabled);
    } else if !common.is_empty() {
        emit("enrich", &format!("Querying {} libraries", config.enrichment.libraries.len()), prog.clone());

        let results = query_libraries(
            client,
            &common,
            &config.enrichment.libraries,
            Duration::from_secs(config.enrichment.timeout_secs),
        )
        .await;

        for result in &results.libraries {
            match &result.outcome {
                LibraryOutcome::Enriched { .. } => {}
                LibraryOutcome::Empty => report.notices.push(PipelineNotice::LibraryEmpty {
                    library: result.library.name.clone(),
                }),
                LibraryOutcome::Failed { reason } => {
                    report.notices.push(PipelineNotice::LibraryFailed {
                        library: result.library.name.clone(),
                        reason: reason.clone(),
                    });
                    report.errors.push(format!("{}: {reason}", result.library.name));
                }
            }
        }
        prog.libraries_done = results.libraries.len();
        report.enrichment = Some(results);
    }

    let tables = report.enrichment.as_ref().map(|e| e.tables()).unwrap_or_default();

    // ── 5. Network ───────────────────────────────────────────────────────────
    if config.display.show_network {
        emit("network", "Assembling network", prog.clone());
        let options = AssemblyOptions::with_max_terms(config.display.max_pathways_in_network);
        report.graph = Some(assemble(&common, &proteomics, &tables, &options));
    }

    // ── 6. Associations ──────────────────────────────────────────────────────
    if config.display.show_association_table {
        emit("associate", "Aggregating associations", prog.clone());
        report.associations = Some(aggregate(&common, &proteomics, &tables));
    }

    report.common_genes = Some(common);
    let report = finish(report, t0);

    emit(
        "complete",
        &format!(
            "Done. {} common genes, {} notices, {} errors.",
            prog.common_genes,
            report.notices.len(),
            report.errors.len()
        ),
        prog,
    );
    report
}

fn finish(mut report: IntegrationReport, t0: Instant) -> IntegrationReport {
    report.duration_ms = t0.elapsed().as_millis() as u64;
    info!(
        run_id = %report.run_id,
        common_genes = report.common_genes.as_ref().map(GeneSet::len),
        notices = report.notices.len(),
        errors = report.errors.len(),
        duration_ms = report.duration_ms,
        "Integration pipeline complete"
    );
    report
}
