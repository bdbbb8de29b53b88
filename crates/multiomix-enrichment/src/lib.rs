//! Gene-set enrichment lookups against external annotation libraries.
//!
//! The statistics live in the remote service; this crate only owns the
//! request/response contract and the per-library failure isolation.
//!
//! | Library (default)      | Backing id         | Term category |
//! |------------------------|--------------------|---------------|
//! | Reactome Pathways      | `Reactome_2016`    | pathway       |
//! | Disease Associations   | `OMIM_Disease`     | disease       |
//! | HMDB Metabolites       | `HMDB_Metabolites` | metabolite    |
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use multiomix_common::{GeneSet, pipeline_config::default_libraries};
//! use multiomix_enrichment::{EnrichrClient, query_libraries};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = EnrichrClient::new("https://maayanlab.cloud/Enrichr")?;
//!     let genes: GeneSet = ["TP53", "BRCA1", "EGFR"].into_iter().collect();
//!
//!     let results = query_libraries(&client, &genes, &default_libraries(), Duration::from_secs(30)).await;
//!     for result in &results.libraries {
//!         println!("{}: {}", result.library.name, result.outcome.summary());
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod enrichr;
pub mod mock;

pub use client::{query_libraries, EnrichmentClient, EnrichmentResults, LibraryOutcome, LibraryResult};
pub use enrichr::EnrichrClient;
pub use mock::MockEnrichmentClient;
