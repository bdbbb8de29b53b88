//! Deterministic in-memory enrichment client for tests and offline runs.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use multiomix_common::{EnrichmentRecord, EnrichmentTable, GeneSet, LibrarySpec, MultiomixError, Result};

use crate::client::EnrichmentClient;

/// Mock client with canned tables keyed by backing library id.
///
/// Libraries without canned data return an empty table.
#[derive(Default)]
pub struct MockEnrichmentClient {
    tables: HashMap<String, Vec<EnrichmentRecord>>,
    failures: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
}

impl MockEnrichmentClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canned records for a library id.
    pub fn with_records(mut self, library_id: &str, records: Vec<EnrichmentRecord>) -> Self {
        self.tables.insert(library_id.to_string(), records);
        self
    }

    /// Make every query of a library id fail with `reason`.
    pub fn with_failure(mut self, library_id: &str, reason: &str) -> Self {
        self.failures.insert(library_id.to_string(), reason.to_string());
        self
    }

    /// Delay the answer for a library id.
    pub fn with_delay(mut self, library_id: &str, delay: Duration) -> Self {
        self.delays.insert(library_id.to_string(), delay);
        self
    }

    /// Library ids queried so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl EnrichmentClient for MockEnrichmentClient {
    async fn query(&self, _genes: &GeneSet, library: &LibrarySpec) -> Result<EnrichmentTable> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(library.library_id.clone());
        }

        if let Some(delay) = self.delays.get(&library.library_id) {
            tokio::time::sleep(*delay).await;
        }

        if let Some(reason) = self.failures.get(&library.library_id) {
            return Err(MultiomixError::enrichment(&library.name, reason.as_str()));
        }

        Ok(EnrichmentTable {
            library: library.clone(),
            records: self.tables.get(&library.library_id).cloned().unwrap_or_default(),
        })
    }
}
