//! Concord CLI

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use concord::analysis::ComparisonEngine;
use concord::config::Config;
use concord::pipeline::Pipeline;
use concord::processors::Processor;
use concord::reporting::{load_comparisons, print_console_report, JsonFileSink, ResultSink};

#[derive(Parser)]
#[command(name = "concord")]
#[command(about = "Cross-model text analysis agreement pipeline")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one text through both models and compare
    Analyze {
        /// Text to analyze
        #[arg(short, long)]
        text: Option<String>,

        /// Read the text from a file instead
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Context label attached to persisted records
        #[arg(long, default_value = "adhoc")]
        context: String,
    },

    /// Analyze a batch of inputs (one text per line), then report
    Batch {
        /// File with one input text per line
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Aggregate previously persisted comparisons into a report
    Report {
        /// Directory of comparison records (default: <output_dir>/comparisons)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Check that both model backends are reachable
    Check,

    /// Generate sample configuration
    InitConfig {
        /// Output path for configuration file
        #[arg(short, long, default_value = "config/concord.toml")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("concord=debug,info")
    } else {
        EnvFilter::new("concord=info,warn")
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load_or_default(),
    };

    match cli.command {
        Commands::Analyze {
            text,
            file,
            context,
        } => {
            analyze(&config, text, file, &context).await?;
        }

        Commands::Batch { file } => {
            batch(&config, &file).await?;
        }

        Commands::Report { input } => {
            report(&config, input)?;
        }

        Commands::Check => {
            check(&config).await;
        }

        Commands::InitConfig { output } => {
            Config::default().save_toml(&output)?;
            println!("Wrote sample configuration to {}", output.display());
        }
    }

    Ok(())
}

fn build_pipeline(config: &Config) -> Result<Pipeline, Box<dyn std::error::Error>> {
    let remote = Arc::new(config.build_remote()?);
    let local = Arc::new(config.build_local());
    let sink = Arc::new(JsonFileSink::new(&config.output.output_dir)?);
    Ok(Pipeline::new(remote, local, sink))
}

async fn analyze(
    config: &Config,
    text: Option<String>,
    file: Option<PathBuf>,
    context: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let input = match (text, file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(path)?,
        (None, None) => return Err("provide the input with --text or --file".into()),
    };

    let pipeline = build_pipeline(config)?;
    let record = pipeline.process_single(&input, context).await?;

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

async fn batch(config: &Config, file: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(file)?;
    let inputs: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    if inputs.is_empty() {
        return Err(format!("no input texts found in {}", file.display()).into());
    }

    let pipeline = build_pipeline(config)?;
    let outcomes = pipeline.process_many(&inputs).await;

    let records: Vec<_> = outcomes
        .iter()
        .filter_map(|outcome| outcome.as_ref().ok().cloned())
        .collect();
    let failed = outcomes.len() - records.len();

    println!(
        "Processed {} inputs: {} compared, {} failed",
        outcomes.len(),
        records.len(),
        failed
    );

    if !records.is_empty() {
        let report = pipeline.summarize(&records)?;
        print_console_report(&report);
    }

    Ok(())
}

fn report(config: &Config, input: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let dir = input.unwrap_or_else(|| {
        PathBuf::from(&config.output.output_dir).join("comparisons")
    });

    let records = load_comparisons(&dir)?;
    println!("Loaded {} comparison records from {}", records.len(), dir.display());

    let aggregated = ComparisonEngine::new().aggregate(&records)?;

    let sink = JsonFileSink::new(&config.output.output_dir)?;
    let locator = sink.persist_report(&aggregated)?;
    print_console_report(&aggregated);
    println!("Report saved to {}", locator.display());

    Ok(())
}

async fn check(config: &Config) {
    match config.build_remote() {
        Ok(remote) => {
            let healthy = remote.health_check().await.unwrap_or(false);
            print_health(&remote, healthy);
        }
        Err(error) => println!("remote: not configured ({error})"),
    }

    let local = config.build_local();
    let healthy = local.health_check().await.unwrap_or(false);
    print_health(&local, healthy);
}

fn print_health(processor: &dyn Processor, healthy: bool) {
    let status = if healthy { "ok" } else { "unreachable" };
    println!("{}: {} {}", processor.name(), status, processor.describe_model());
}
