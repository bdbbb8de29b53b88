//! Run artifacts written to the output directory.
//!
//! | File               | Contents                                   |
//! |--------------------|--------------------------------------------|
//! | `report.json`      | full integration report                    |
//! | `graph.json`       | network nodes, edges and legend            |
//! | `associations.csv` | per-gene association table                 |
//! | `enrichment.json`  | per-library enrichment outcomes            |

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::info;

use multiomix_ingestion::IntegrationReport;
use multiomix_kg::{graph_to_json, write_associations_csv};

/// Write every artifact the report carries. Returns the written paths.
pub fn write_artifacts(report: &IntegrationReport, dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let mut written = Vec::new();

    let path = dir.join("report.json");
    fs::write(&path, serde_json::to_string_pretty(report)?)
        .with_context(|| format!("writing {}", path.display()))?;
    written.push(path);

    if let Some(graph) = &report.graph {
        let path = dir.join("graph.json");
        fs::write(&path, graph_to_json(graph)?).with_context(|| format!("writing {}", path.display()))?;
        written.push(path);
    }

    if let Some(rows) = &report.associations {
        let path = dir.join("associations.csv");
        let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        write_associations_csv(rows, BufWriter::new(file))?;
        written.push(path);
    }

    if let Some(enrichment) = &report.enrichment {
        let path = dir.join("enrichment.json");
        fs::write(&path, serde_json::to_string_pretty(enrichment)?)
            .with_context(|| format!("writing {}", path.display()))?;
        written.push(path);
    }

    info!(dir = %dir.display(), files = written.len(), "Artifacts written");
    Ok(written)
}
