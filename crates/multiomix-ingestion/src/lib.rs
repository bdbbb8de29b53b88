//! multiomix-ingestion: Table loading, threshold filtering and the
//! integration pipeline.
//! - CSV loading into raw tables
//! - Schema validation and row typing
//! - Per-source threshold filtering
//! - Common gene set resolution
//! - Pipeline orchestration with progress events

pub mod common_set;
pub mod filter;
pub mod loader;
pub mod pipeline;
pub mod schema;

pub use common_set::resolve;
pub use filter::{filter, filter_source};
pub use loader::{load_csv, read_csv};
pub use pipeline::{
    run_integration, IntegrationProgress, IntegrationReport, OmicsInputs, PipelineNotice, TablePreview,
};
pub use schema::validate_table;
