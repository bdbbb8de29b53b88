//! Configuration loading for Multiomix.
//! Reads the file named by `--config`, else the MULTIOMIX_CONFIG env var,
//! else multiomix.toml in the current directory. Without any file the
//! built-in defaults apply. Command-line flags override file values.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{info, warn};

use multiomix_common::PipelineConfig;

pub const CONFIG_ENV: &str = "MULTIOMIX_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "multiomix.toml";

/// Values given on the command line; `None` leaves the file value alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub genomics: Option<PathBuf>,
    pub transcriptomics: Option<PathBuf>,
    pub proteomics: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub cadd: Option<f64>,
    pub tpm: Option<f64>,
    pub intensity: Option<f64>,
    pub max_pathways: Option<usize>,
    pub skip_enrichment: bool,
}


/// Which file to read, if any.
fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    let default = PathBuf::from(DEFAULT_CONFIG_FILE);
    default.exists().then_some(default)
}

/// Load configuration and apply overrides. The result is validated.
pub fn load(explicit: Option<&Path>, overrides: &Overrides) -> anyhow::Result<PipelineConfig> {
    let mut config = match resolve_path(explicit) {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!(
                    "Config file not found: {}\n\
                     Run `multiomix config > {DEFAULT_CONFIG_FILE}` and edit it.",
                    path.display()
                );
            }
            let config = PipelineConfig::from_file(&path)
                .with_context(|| format!("loading {}", path.display()))?;
            info!(path = %path.display(), "Configuration loaded");
            config
        }
        None => {
            warn!("No {DEFAULT_CONFIG_FILE} found; using built-in defaults");
            PipelineConfig::default()
        }
    };

    apply(&mut config, overrides);
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn apply(config: &mut PipelineConfig, o: &Overrides) {
    let as_string = |p: &PathBuf| p.to_string_lossy().into_owned();

    if let Some(p) = &o.genomics        { config.inputs.genomics = Some(as_string(p)); }
    if let Some(p) = &o.transcriptomics { config.inputs.transcriptomics = Some(as_string(p)); }
    if let Some(p) = &o.proteomics      { config.inputs.proteomics = Some(as_string(p)); }
    if let Some(p) = &o.output_dir      { config.output.dir = as_string(p); }

    if let Some(v) = o.cadd      { config.thresholds.cadd = v; }
    if let Some(v) = o.tpm       { config.thresholds.tpm = v; }
    if let Some(v) = o.intensity { config.thresholds.intensity = v; }

    if let Some(n) = o.max_pathways {
        config.display.max_pathways_in_network = n;
    }
    if o.skip_enrichment {
        config.display.run_enrichment = false;
    }
}
