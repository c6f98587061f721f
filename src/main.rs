//! CLI entry point for the air-quality ETL pipeline.
//!
//! Provides subcommands for transforming raw per-city payloads into the
//! staged dataset, loading it into Supabase, producing the analysis reports,
//! and running all three in sequence.

use air_quality_etl::analyzers::analyzer::{analyze, dataset_from_staged, dataset_from_store};
use air_quality_etl::config::PipelineConfig;
use air_quality_etl::infra::supabase::SupabaseStore;
use air_quality_etl::load::load_dataset;
use air_quality_etl::output::print_json;
use air_quality_etl::transform::dataset::Dataset;
use air_quality_etl::transform::{TransformOutcome, run_transform};
use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "air_quality_etl")]
#[command(about = "Transform, load and analyze hourly air-quality data", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: PipelineConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive features from raw payloads and write the staged CSV
    Transform,
    /// Upsert the staged CSV into the Supabase table
    Load,
    /// Compute summary metrics and write the report CSVs
    Analyze {
        /// Read rows back from the Supabase table instead of the staged CSV
        #[arg(long, default_value_t = false)]
        from_store: bool,
    },
    /// Run transform, load and analyze in sequence
    Run {
        /// Skip the load step (no store credentials needed)
        #[arg(long, default_value_t = false)]
        skip_load: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/air_quality_etl.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("air_quality_etl.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let config = cli.config;
    config.validate()?;

    match cli.command {
        Commands::Transform => {
            transform_step(&config)?;
        }
        Commands::Load => {
            let dataset = dataset_from_staged(&config)?;
            load_step(&config, &dataset).await?;
        }
        Commands::Analyze { from_store } => {
            let dataset = if from_store {
                let (url, key) = config.supabase_credentials()?;
                let store = SupabaseStore::connect(url, key, &config.table)?;
                dataset_from_store(&store).await?
            } else {
                dataset_from_staged(&config)?
            };
            analyze_step(&config, &dataset)?;
        }
        Commands::Run { skip_load } => {
            info!("Starting full air quality pipeline");

            let outcome = transform_step(&config)?;
            if skip_load {
                info!("Load step skipped");
            } else {
                load_step(&config, &outcome.dataset).await?;
            }
            analyze_step(&config, &outcome.dataset)?;

            info!("Pipeline completed");
        }
    }

    Ok(())
}

/// Runs the transform and surfaces per-city failures. Fails only when every
/// payload was rejected.
fn transform_step(config: &PipelineConfig) -> Result<TransformOutcome> {
    let outcome = run_transform(config)?;

    if !outcome.failures.is_empty() {
        for failure in &outcome.failures {
            error!(error = %failure, "City skipped");
        }
        warn!(
            failed_cities = outcome.failures.len(),
            loaded_cities = outcome.stats.cities,
            "Transform finished with rejected payloads"
        );

        if outcome.stats.cities == 0 {
            bail!("all {} raw payloads were rejected", outcome.failures.len());
        }
    }

    print_json(&outcome.stats)?;
    Ok(outcome)
}

#[tracing::instrument(skip_all, fields(table = %config.table, batch_size = config.batch_size))]
async fn load_step(config: &PipelineConfig, dataset: &Dataset) -> Result<()> {
    let (url, key) = config.supabase_credentials()?;
    let store = SupabaseStore::connect(url, key, &config.table)?;

    let report = load_dataset(&store, dataset.rows(), config.batch_size).await;

    info!(
        "Load finished: {}/{} rows inserted",
        report.inserted, report.total
    );
    print_json(&report.summary())?;
    Ok(())
}

fn analyze_step(config: &PipelineConfig, dataset: &Dataset) -> Result<()> {
    let metrics = analyze(config, dataset)?;
    print_json(&metrics.kpis)?;
    Ok(())
}
