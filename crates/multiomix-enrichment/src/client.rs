//! The enrichment service boundary and the isolated per-library fan-out.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use multiomix_common::{EnrichmentTable, GeneSet, LibrarySpec, Result};

/// Common interface for enrichment services.
///
/// Implementations can use:
/// - the Enrichr REST API (remote)
/// - canned tables (testing, offline runs)
#[async_trait]
pub trait EnrichmentClient: Send + Sync {
    /// Query one library with a gene list. Returns the enriched terms in
    /// service rank order; an empty table means no term matched.
    async fn query(&self, genes: &GeneSet, library: &LibrarySpec) -> Result<EnrichmentTable>;
}

// ── Outcomes ──────────────────────────────────────────────────────────────────

/// What happened to one library query. `Empty` and `Failed` contribute
/// nothing downstream but are kept apart for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LibraryOutcome {
    Enriched { table: EnrichmentTable },
    Empty,
    Failed { reason: String },
}

impl LibraryOutcome {
    pub fn table(&self) -> Option<&EnrichmentTable> {
        match self {
            LibraryOutcome::Enriched { table } => Some(table),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, LibraryOutcome::Failed { .. })
    }

    pub fn summary(&self) -> String {
        match self {
            LibraryOutcome::Enriched { table } => format!("{} terms", table.len()),
            LibraryOutcome::Empty => "no enriched terms".to_string(),
            LibraryOutcome::Failed { reason } => format!("failed: {reason}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LibraryResult {
    pub library: LibrarySpec,
    pub outcome: LibraryOutcome,
    pub duration_ms: u64,
}

/// Outcomes of all configured libraries, in configured order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EnrichmentResults {
    pub libraries: Vec<LibraryResult>,
}

impl EnrichmentResults {
    /// Tables of the libraries that returned at least one term.
    pub fn tables(&self) -> Vec<EnrichmentTable> {
        self.libraries
            .iter()
            .filter_map(|r| r.outcome.table().cloned())
            .collect()
    }

    /// Outcome for a library display name.
    pub fn get(&self, name: &str) -> Option<&LibraryOutcome> {
        self.libraries
            .iter()
            .find(|r| r.library.name == name)
            .map(|r| &r.outcome)
    }

    /// `(library name, reason)` of every failed query.
    pub fn failures(&self) -> Vec<(String, String)> {
        self.libraries
            .iter()
            .filter_map(|r| match &r.outcome {
                LibraryOutcome::Failed { reason } => Some((r.library.name.clone(), reason.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn has_results(&self) -> bool {
        self.libraries.iter().any(|r| r.outcome.table().is_some())
    }
}

// ── Fan-out ───────────────────────────────────────────────────────────────────

/// Query every library concurrently. Each query has its own timeout and
/// failure boundary: an error or timeout only turns that library's outcome
/// into `Failed`.
#[instrument(skip(client, genes, libraries), fields(genes = genes.len(), libraries = libraries.len()))]
pub async fn query_libraries(
    client: &dyn EnrichmentClient,
    genes: &GeneSet,
    libraries: &[LibrarySpec],
    timeout: Duration,
) -> EnrichmentResults {
    let queries = libraries.iter().map(|library| async move {
        let t0 = Instant::now();
        let outcome = match tokio::time::timeout(timeout, client.query(genes, library)).await {
            Ok(Ok(table)) if table.is_empty() => {
                debug!(library = %library.name, "Library returned no enriched terms");
                LibraryOutcome::Empty
            }
            Ok(Ok(table)) => {
                info!(library = %library.name, terms = table.len(), "Library enriched");
                LibraryOutcome::Enriched { table }
            }
            Ok(Err(e)) => {
                warn!(library = %library.name, error = %e, "Enrichment query failed");
                LibraryOutcome::Failed { reason: e.to_string() }
            }
            Err(_) => {
                warn!(library = %library.name, timeout_secs = timeout.as_secs_f64(), "Enrichment query timed out");
                LibraryOutcome::Failed {
                    reason: format!("timed out after {:.1}s", timeout.as_secs_f64()),
                }
            }
        };
        LibraryResult {
            library: library.clone(),
            outcome,
            duration_ms: t0.elapsed().as_millis() as u64,
        }
    });

    EnrichmentResults {
        libraries: join_all(queries).await,
    }
}
