//! multiomix-common: Shared types, errors, and configuration used across all Multiomix crates.

pub mod error;
pub mod entities;
pub mod pipeline_config;
pub mod sandbox;

// Re-export commonly used types
pub use error::{MultiomixError, Result};
pub use entities::{
    EnrichmentRecord, EnrichmentTable, FilteredTable, GeneSet, LibrarySpec, MeasurementRow,
    MeasurementTable, OmicsSource, RawTable, TermCategory,
};
pub use pipeline_config::{DisplayConfig, EnrichmentConfig, PipelineConfig, ThresholdConfig};
