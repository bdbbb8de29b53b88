//! Pipeline configuration.
//!
//! Thresholds, display switches, enrichment libraries and I/O locations for
//! one integration run. Loadable from TOML, YAML or JSON; every field has a
//! default so a partial file is enough.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::entities::{LibrarySpec, OmicsSource, TermCategory};
use crate::error::{MultiomixError, Result};

/// Allowed range for `display.max_pathways_in_network`.
pub const MAX_PATHWAYS_RANGE: (usize, usize) = (1, 100);
/// Allowed range for `display.preview_row_count`.
pub const PREVIEW_ROWS_RANGE: (usize, usize) = (5, 50);

/// Complete configuration for one integration run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub thresholds: ThresholdConfig,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub enrichment: EnrichmentConfig,

    #[serde(default)]
    pub inputs: InputConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

// ── Thresholds ────────────────────────────────────────────────────────────────

/// Minimum value a row's measurement must reach to pass the filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Minimum CADD score (genomics)
    #[serde(default = "default_cadd")]
    pub cadd: f64,

    /// Minimum TPM (transcriptomics)
    #[serde(default = "default_tpm")]
    pub tpm: f64,

    /// Minimum intensity (proteomics)
    #[serde(default = "default_intensity")]
    pub intensity: f64,
}

fn default_cadd() -> f64 { 20.0 }
fn default_tpm() -> f64 { 1.0 }
fn default_intensity() -> f64 { 1000.0 }

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            cadd: default_cadd(),
            tpm: default_tpm(),
            intensity: default_intensity(),
        }
    }
}

impl ThresholdConfig {
    pub fn for_source(&self, source: OmicsSource) -> f64 {
        match source {
            OmicsSource::Genomics        => self.cadd,
            OmicsSource::Transcriptomics => self.tpm,
            OmicsSource::Proteomics      => self.intensity,
        }
    }
}

// ── Display ───────────────────────────────────────────────────────────────────

/// Which sections of the run are produced, and how much of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_true")]
    pub run_enrichment: bool,

    #[serde(default = "default_true")]
    pub show_network: bool,

    #[serde(default = "default_true")]
    pub show_association_table: bool,

    /// Terms taken from each library when building the network (1–100).
    #[serde(default = "default_max_pathways")]
    pub max_pathways_in_network: usize,

    /// Rows kept in each filtered-table preview (5–50).
    #[serde(default = "default_preview_rows")]
    pub preview_row_count: usize,
}

fn default_true() -> bool { true }
fn default_max_pathways() -> usize { 10 }
fn default_preview_rows() -> usize { 10 }

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            run_enrichment: true,
            show_network: true,
            show_association_table: true,
            max_pathways_in_network: default_max_pathways(),
            preview_row_count: default_preview_rows(),
        }
    }
}

// ── Enrichment ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Enrichr API root
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-library request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Description attached to the uploaded gene list
    #[serde(default = "default_description")]
    pub description: String,

    /// Libraries to query, in display order
    #[serde(default = "default_libraries")]
    pub libraries: Vec<LibrarySpec>,
}

fn default_base_url() -> String { "https://maayanlab.cloud/Enrichr".to_string() }
fn default_timeout_secs() -> u64 { 30 }
fn default_description() -> String { "multiomix common genes".to_string() }

pub fn default_libraries() -> Vec<LibrarySpec> {
    vec![
        LibrarySpec::new("Reactome Pathways", "Reactome_2016", TermCategory::Pathway),
        LibrarySpec::new("Disease Associations", "OMIM_Disease", TermCategory::Disease),
        LibrarySpec::new("HMDB Metabolites", "HMDB_Metabolites", TermCategory::Metabolite),
    ]
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            description: default_description(),
            libraries: default_libraries(),
        }
    }
}

// ── Inputs / Output ───────────────────────────────────────────────────────────

/// Paths of the three input CSV files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputConfig {
    pub genomics: Option<String>,
    pub transcriptomics: Option<String>,
    pub proteomics: Option<String>,
}

impl InputConfig {
    pub fn path_for(&self, source: OmicsSource) -> Option<&str> {
        match source {
            OmicsSource::Genomics        => self.genomics.as_deref(),
            OmicsSource::Transcriptomics => self.transcriptomics.as_deref(),
            OmicsSource::Proteomics      => self.proteomics.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory the run artifacts are written to
    #[serde(default = "default_output_dir")]
    pub dir: String,
}

fn default_output_dir() -> String { "./multiomix-out".to_string() }

impl Default for OutputConfig {
    fn default() -> Self {
        Self { dir: default_output_dir() }
    }
}

// ── Helper Methods ─────────────────────────────────────────────────────────────

impl PipelineConfig {
    /// Load from a file, picking the format by extension (toml, yaml/yml, json).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("toml")
            .to_ascii_lowercase();

        let config: Self = match ext.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&content)
                .map_err(|e| MultiomixError::Config(format!("{}: {e}", path.display())))?,
            "json" => serde_json::from_str(&content)?,
            _ => toml::from_str(&content)
                .map_err(|e| MultiomixError::Config(format!("{}: {e}", path.display())))?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Save as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| MultiomixError::Config(e.to_string()))
    }

    /// Check thresholds are finite and the display ranges are respected.
    pub fn validate(&self) -> Result<()> {
        for source in OmicsSource::ALL {
            let t = self.thresholds.for_source(source);
            if !t.is_finite() {
                return Err(MultiomixError::Config(format!(
                    "{} threshold must be a finite number, got {t}",
                    source.numeric_column()
                )));
            }
        }

        let (lo, hi) = MAX_PATHWAYS_RANGE;
        if !(lo..=hi).contains(&self.display.max_pathways_in_network) {
            return Err(MultiomixError::Config(format!(
                "max_pathways_in_network must be in [{lo}, {hi}], got {}",
                self.display.max_pathways_in_network
            )));
        }

        let (lo, hi) = PREVIEW_ROWS_RANGE;
        if !(lo..=hi).contains(&self.display.preview_row_count) {
            return Err(MultiomixError::Config(format!(
                "preview_row_count must be in [{lo}, {hi}], got {}",
                self.display.preview_row_count
            )));
        }

        if self.enrichment.timeout_secs == 0 {
            return Err(MultiomixError::Config("enrichment.timeout_secs must be > 0".to_string()));
        }

        let mut names = std::collections::HashSet::new();
        for lib in &self.enrichment.libraries {
            if !names.insert(lib.name.as_str()) {
                return Err(MultiomixError::Config(format!(
                    "duplicate enrichment library name: {}",
                    lib.name
                )));
            }
        }

        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.thresholds.cadd, 20.0);
        assert_eq!(config.thresholds.tpm, 1.0);
        assert_eq!(config.thresholds.intensity, 1000.0);
        assert!(config.display.run_enrichment);
        assert_eq!(config.display.max_pathways_in_network, 10);
        assert_eq!(config.enrichment.libraries.len(), 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_threshold_for_source() {
        let t = ThresholdConfig::default();
        assert_eq!(t.for_source(OmicsSource::Genomics), 20.0);
        assert_eq!(t.for_source(OmicsSource::Proteomics), 1000.0);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: PipelineConfig = toml::from_str(
            r#"
            [thresholds]
            cadd = 15.0

            [display]
            show_network = false
            "#,
        ).unwrap();
        assert_eq!(config.thresholds.cadd, 15.0);
        assert_eq!(config.thresholds.tpm, 1.0);
        assert!(!config.display.show_network);
        assert!(config.display.show_association_table);
        assert_eq!(config.enrichment.libraries[0].library_id, "Reactome_2016");
    }

    #[test]
    fn test_validate_rejects_out_of_range_sliders() {
        let mut config = PipelineConfig::default();
        config.display.max_pathways_in_network = 0;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.display.preview_row_count = 51;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_finite_threshold() {
        let mut config = PipelineConfig::default();
        config.thresholds.tpm = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_library_names() {
        let mut config = PipelineConfig::default();
        let first = config.enrichment.libraries[0].clone();
        config.enrichment.libraries.push(first);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = PipelineConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: PipelineConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.enrichment.libraries, config.enrichment.libraries);
        assert_eq!(parsed.display.preview_row_count, config.display.preview_row_count);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = PipelineConfig::default();
        let text = config.to_toml().unwrap();
        let parsed: PipelineConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.thresholds.intensity, 1000.0);
    }
}
