//! Enrichr REST API client.
//!
//! API docs: https://maayanlab.cloud/Enrichr/help#api
//!
//! Two calls per run:
//!   - `POST {base}/addList` (multipart `list`, `description`) -> `userListId`
//!   - `GET  {base}/enrich?userListId=..&backgroundType=<library>` per library
//!
//! The enrich response is `{ "<library>": [row, ...] }` where each row is
//! `[rank, term, p_value, z_score, combined_score, [genes], adjusted_p, ...]`.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use multiomix_common::entities::split_member_genes;
use multiomix_common::pipeline_config::EnrichmentConfig;
use multiomix_common::sandbox::SandboxClient;
use multiomix_common::{EnrichmentRecord, EnrichmentTable, GeneSet, LibrarySpec, MultiomixError, Result};

use crate::client::EnrichmentClient;

/// A gene list already uploaded to Enrichr.
#[derive(Debug, Clone)]
struct UploadedList {
    genes: Vec<String>,
    user_list_id: u64,
}

pub struct EnrichrClient {
    client: SandboxClient,
    base_url: String,
    description: String,
    uploaded: Mutex<Option<UploadedList>>,
}

impl EnrichrClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::build(base_url, "multiomix common genes", multiomix_common::sandbox::DEFAULT_TIMEOUT)
    }

    pub fn from_config(cfg: &EnrichmentConfig) -> Result<Self> {
        Self::build(&cfg.base_url, &cfg.description, Duration::from_secs(cfg.timeout_secs))
    }

    fn build(base_url: &str, description: &str, timeout: Duration) -> Result<Self> {
        let mut client = SandboxClient::with_timeout(timeout)?;
        client.allow_url(base_url)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            description: description.to_string(),
            uploaded: Mutex::new(None),
        })
    }

    /// Upload the gene list once and reuse its id for every library.
    async fn user_list_id(&self, genes: &GeneSet) -> Result<u64> {
        let genes = genes.to_vec();
        let mut uploaded = self.uploaded.lock().await;
        if let Some(list) = uploaded.as_ref() {
            if list.genes == genes {
                return Ok(list.user_list_id);
            }
        }
        let user_list_id = self.add_list(&genes).await?;
        *uploaded = Some(UploadedList { genes, user_list_id });
        Ok(user_list_id)
    }

    #[instrument(skip(self, genes), fields(genes = genes.len()))]
    async fn add_list(&self, genes: &[String]) -> Result<u64> {
        let form = reqwest::multipart::Form::new()
            .text("list", genes.join("\n"))
            .text("description", self.description.clone());

        let resp = self.client
            .post(&format!("{}/addList", self.base_url))?
            .multipart(form)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(MultiomixError::Other(anyhow::anyhow!(
                "gene list upload failed: HTTP {}",
                resp.status()
            )));
        }

        let body = resp.json::<Value>().await?;
        let id = body["userListId"].as_u64().ok_or_else(|| {
            MultiomixError::Other(anyhow::anyhow!("addList response has no userListId: {body}"))
        })?;
        info!(user_list_id = id, "Gene list uploaded to Enrichr");
        Ok(id)
    }

    async fn enrich(&self, user_list_id: u64, library: &LibrarySpec) -> Result<Value> {
        let resp = self.client
            .get(&format!("{}/enrich", self.base_url))?
            .query(&[
                ("userListId", user_list_id.to_string()),
                ("backgroundType", library.library_id.clone()),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(MultiomixError::enrichment(&library.name, format!("HTTP {}", resp.status())));
        }

        Ok(resp.json::<Value>().await?)
    }
}

#[async_trait]
impl EnrichmentClient for EnrichrClient {
    #[instrument(skip(self, genes, library), fields(library = %library.name))]
    async fn query(&self, genes: &GeneSet, library: &LibrarySpec) -> Result<EnrichmentTable> {
        let result = async {
            let user_list_id = self.user_list_id(genes).await?;
            let body = self.enrich(user_list_id, library).await?;
            parse_enrich_response(library, &body)
        }
        .await;

        result.map_err(|e| match e {
            MultiomixError::EnrichmentService { .. } => e,
            other => MultiomixError::enrichment(&library.name, other.to_string()),
        })
    }
}

// ── Response parsing ──────────────────────────────────────────────────────────

/// Turn an `enrich` response body into a table for `library`.
pub fn parse_enrich_response(library: &LibrarySpec, body: &Value) -> Result<EnrichmentTable> {
    if let Some(err) = body.get("error") {
        return Err(MultiomixError::enrichment(&library.name, format!("service error: {err}")));
    }

    let rows = body
        .get(&library.library_id)
        .and_then(Value::as_array)
        .ok_or_else(|| {
            MultiomixError::enrichment(
                &library.name,
                format!("response has no result list for '{}'", library.library_id),
            )
        })?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let record = parse_row(row).ok_or_else(|| {
            MultiomixError::enrichment(&library.name, format!("malformed result row {i}: {row}"))
        })?;
        records.push(record);
    }

    debug!(library = %library.name, terms = records.len(), "Parsed enrichment response");
    Ok(EnrichmentTable { library: library.clone(), records })
}

fn parse_row(row: &Value) -> Option<EnrichmentRecord> {
    let cols = row.as_array()?;
    let term = cols.get(1)?.as_str()?.to_string();
    let combined_score = cols.get(4)?.as_f64()?;

    let member_genes = match cols.get(5) {
        Some(Value::Array(genes)) => genes
            .iter()
            .filter_map(Value::as_str)
            .flat_map(split_member_genes)
            .collect(),
        Some(Value::String(genes)) => split_member_genes(genes),
        _ => Vec::new(),
    };

    Some(EnrichmentRecord {
        term,
        member_genes,
        combined_score,
        rank: cols.first().and_then(Value::as_u64).map(|r| r as u32),
        p_value: cols.get(2).and_then(Value::as_f64),
        adjusted_p_value: cols.get(6).and_then(Value::as_f64),
        z_score: cols.get(3).and_then(Value::as_f64),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use multiomix_common::TermCategory;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn reactome() -> LibrarySpec {
        LibrarySpec::new("Reactome Pathways", "Reactome_2016", TermCategory::Pathway)
    }

    #[test]
    fn test_parse_enrich_response() {
        let body = json!({
            "Reactome_2016": [
                [1, "Apoptosis_Homo sapiens_R-HSA-109581", 0.0001, -2.5, 23.4, ["TP53", "BRCA1"], 0.002, 0, 0],
                [2, "Cell Cycle_Homo sapiens_R-HSA-1640170", 0.01, -1.9, 8.7, ["TP53"], 0.05, 0, 0]
            ]
        });
        let table = parse_enrich_response(&reactome(), &body).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].term, "Apoptosis_Homo sapiens_R-HSA-109581");
        assert_eq!(table.records[0].member_genes, vec!["TP53", "BRCA1"]);
        assert_eq!(table.records[0].rank, Some(1));
        assert_eq!(table.records[1].adjusted_p_value, Some(0.05));
    }

    #[test]
    fn test_parse_delimited_gene_string() {
        let body = json!({ "Reactome_2016": [[1, "Apoptosis", 0.01, -1.0, 5.0, "TP53;BRCA1", 0.02]] });
        let table = parse_enrich_response(&reactome(), &body).unwrap();
        assert_eq!(table.records[0].member_genes, vec!["TP53", "BRCA1"]);
    }

    #[test]
    fn test_parse_empty_result_list() {
        let body = json!({ "Reactome_2016": [] });
        let table = parse_enrich_response(&reactome(), &body).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_parse_missing_library_is_error() {
        let body = json!({ "OMIM_Disease": [] });
        let err = parse_enrich_response(&reactome(), &body).unwrap_err();
        assert!(matches!(err, MultiomixError::EnrichmentService { .. }));
    }

    #[test]
    fn test_parse_service_error_body() {
        let body = json!({ "error": "Invalid userListId" });
        assert!(parse_enrich_response(&reactome(), &body).is_err());
    }

    #[test]
    fn test_parse_malformed_row_is_error() {
        let body = json!({ "Reactome_2016": [[1, 42, 0.01]] });
        let err = parse_enrich_response(&reactome(), &body).unwrap_err();
        assert!(err.to_string().contains("malformed result row 0"));
    }

    #[test]
    fn test_client_trims_base_url() {
        let client = EnrichrClient::new("https://maayanlab.cloud/Enrichr/").unwrap();
        assert_eq!(client.base_url, "https://maayanlab.cloud/Enrichr");
    }
}
