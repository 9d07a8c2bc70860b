use clap::{Parser, Subcommand};
use reel_metrics::api::TmdbClient;
use reel_metrics::config::{load_config, LoggingConfig};
use reel_metrics::logging::init_logging;
use reel_metrics::pipeline::{
    extract_stage, run_analysis, run_from_raw, run_pipeline, PipelineOutput,
};
use reel_metrics::{AppConfig, PipelineError};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "reel-metrics")]
#[command(about = "Fetch, clean, analyze and chart movie metadata", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.json", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the whole pipeline (default if no command specified)
    Run {
        /// Replay a raw JSON snapshot instead of calling the API
        #[arg(long)]
        from_raw: Option<PathBuf>,
    },

    /// Only fetch movies and write the raw snapshot
    Extract,

    /// Analysis, report and charts from an existing analytics CSV
    Analyze {
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Load and validate the configuration
    CheckConfig,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            let _guard = init_logging(&LoggingConfig::default());
            error!("Config load error ({}): {}", cli.config.display(), e);
            return ExitCode::FAILURE;
        }
    };
    let _guard = init_logging(&config.logging);

    let result = match cli.command {
        None => run_command(&config, None).await,
        Some(Commands::Run { from_raw }) => run_command(&config, from_raw.as_deref()).await,
        Some(Commands::Extract) => extract_command(&config).await,
        Some(Commands::Analyze { input }) => run_analysis(&input, &config).map(print_output),
        Some(Commands::CheckConfig) => {
            check_config_command(&config);
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Pipeline failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_output(output: PipelineOutput) {
    println!("{}", output.report);
    for (name, path) in &output.charts {
        info!("Chart {}: {}", name, path.display());
    }
}

async fn run_command(config: &AppConfig, from_raw: Option<&Path>) -> Result<(), PipelineError> {
    let output = match from_raw {
        Some(path) => {
            info!("Replaying raw snapshot {}", path.display());
            run_from_raw(path, config)?
        }
        None => {
            config.require_api_key()?;
            let client = TmdbClient::new(&config.api)?;
            run_pipeline(&client, config).await?
        }
    };
    print_output(output);
    Ok(())
}

async fn extract_command(config: &AppConfig) -> Result<(), PipelineError> {
    config.require_api_key()?;
    let client = TmdbClient::new(&config.api)?;
    let raw = extract_stage(&client, config).await?;
    info!("Extracted {} movies", raw.len());
    Ok(())
}

fn check_config_command(config: &AppConfig) {
    println!("Configuration OK");
    println!("  API:        {} (key {})", config.api.base_url, config.api.masked_key());
    println!(
        "  Extract:    {} ids, discover = {}, max_pages = {}, max_records = {}",
        config.extract.movie_ids.len(),
        config.extract.discover,
        config.extract.max_pages,
        config.extract.max_records
    );
    println!(
        "  Retry:      {} attempts, {}ms initial delay, {}ms cap",
        config.retry.max_attempts, config.retry.initial_delay_ms, config.retry.max_delay_ms
    );
    println!(
        "  Analysis:   top {} movies, top {} franchises/directors",
        config.analysis.top_n, config.analysis.top_groups
    );
    println!(
        "  Output:     {} (charts = {}, sqlite = {})",
        config.output.data_dir, config.output.charts, config.output.sqlite
    );
}
