//! Multiomix: multi-omics integration and enrichment.
//! Entry point for the command-line binary.

mod config;
mod output;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use multiomix_common::PipelineConfig;
use multiomix_enrichment::EnrichrClient;
use multiomix_ingestion::{run_integration, IntegrationProgress, OmicsInputs};

/// Integrate genomics, transcriptomics and proteomics tables, enrich the
/// shared genes and build the association network.
#[derive(Parser)]
#[command(name = "multiomix")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the integration pipeline and write its artifacts
    Run {
        /// Genomics CSV (Gene, CADD)
        #[arg(long)]
        genomics: Option<PathBuf>,

        /// Transcriptomics CSV (Gene, TPM)
        #[arg(long)]
        transcriptomics: Option<PathBuf>,

        /// Proteomics CSV (Gene, Protein, Intensity)
        #[arg(long)]
        proteomics: Option<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Minimum CADD score
        #[arg(long)]
        cadd: Option<f64>,

        /// Minimum TPM
        #[arg(long)]
        tpm: Option<f64>,

        /// Minimum protein intensity
        #[arg(long)]
        intensity: Option<f64>,

        /// Terms per library shown in the network (1-100)
        #[arg(long)]
        max_pathways: Option<usize>,

        /// Skip the enrichment queries
        #[arg(long)]
        no_enrichment: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("multiomix=debug,info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config => {
            let config = config::load(cli.config.as_deref(), &config::Overrides::default())?;
            print!("{}", config.to_toml()?);
        }
        Commands::Run {
            genomics,
            transcriptomics,
            proteomics,
            out,
            cadd,
            tpm,
            intensity,
            max_pathways,
            no_enrichment,
        } => {
            info!("Multiomix starting up...");
            info!("Version: {}", env!("CARGO_PKG_VERSION"));

            let overrides = config::Overrides {
                genomics,
                transcriptomics,
                proteomics,
                output_dir: out,
                cadd,
                tpm,
                intensity,
                max_pathways,
                skip_enrichment: no_enrichment,
            };
            let config = config::load(cli.config.as_deref(), &overrides)?;
            run(&config).await?;
        }
    }

    Ok(())
}

async fn run(config: &PipelineConfig) -> anyhow::Result<()> {
    info!(
        cadd = config.thresholds.cadd,
        tpm = config.thresholds.tpm,
        intensity = config.thresholds.intensity,
        enrichment = config.display.run_enrichment,
        "Configuration ready"
    );

    let inputs = OmicsInputs::load(&config.inputs)?;
    let client = EnrichrClient::from_config(&config.enrichment)?;

    let (tx, rx) = broadcast::channel::<IntegrationProgress>(64);
    let progress = tokio::spawn(drain_progress(rx, |event: IntegrationProgress| {
        info!(stage = %event.stage, "{}", event.message);
    }));

    let report = run_integration(&inputs, config, &client, Some(tx)).await;
    let _ = progress.await;

    for notice in &report.notices {
        warn!("{}", notice.message());
    }

    let written = output::write_artifacts(&report, Path::new(&config.output.dir))?;
    for path in &written {
        info!("  {}", path.display());
    }

    if let Some(genes) = &report.common_genes {
        info!(common_genes = genes.len(), "Multiomix run complete");
    } else {
        warn!(errors = report.errors.len(), "Run finished without results; see report.json");
    }
    Ok(())
}

/// Hand every progress event to `on_event` until all senders are gone.
/// A lagging receiver skips the dropped events and keeps going.
async fn drain_progress<T: Clone>(mut rx: broadcast::Receiver<T>, mut on_event: impl FnMut(T)) -> usize {
    let mut seen = 0;
    loop {
        match rx.recv().await {
            Ok(event) => {
                on_event(event);
                seen += 1;
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "Progress events dropped");
            }
            Err(RecvError::Closed) => break,
        }
    }
    seen
}
