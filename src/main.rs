mod collector;
mod config;
mod crawler;
mod error;
mod handler;
mod keywords;
mod listing;
mod normalize;
mod notify;
mod pipeline;
mod sink;
mod table;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use aws_config::{BehaviorVersion, SdkConfig};
use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::Settings;
use crate::crawler::linkedin::{LaunchProfile, LinkedInScraper};
use crate::error::ConfigError;
use crate::notify::SnsNotifier;
use crate::sink::{S3Store, Sink};

#[derive(Parser)]
#[command(name = "jobs_pipeline", about = "LinkedIn job listings scraper and keyword extractor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape listings and write the cleaned table
    Scrape {
        /// Stage locally and upload to S3 instead of writing OUTPUT_PATH
        #[arg(long)]
        remote: bool,
    },
    /// Hosted run: upload to S3, notify on failure, print a JSON result
    Invoke,
    /// Print the top keywords of a previously written table
    Keywords {
        /// Table to read
        #[arg(short, long, default_value = "csv_file.csv")]
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Scrape { remote } => {
            let settings = load_settings()?;
            let scraper = LinkedInScraper::new(settings.scraper_options(LaunchProfile::Desktop));
            let sink = if remote {
                let sdk = aws_sdk_config().await;
                remote_sink(&settings, &sdk)
            } else {
                Sink::local(&settings.output.csv_path)
            };

            let report = pipeline::run(&scraper, &settings.queries(), sink).await?;
            println!("Wrote {} listings to {}", report.rows, report.destination);
            Ok(())
        }
        Commands::Invoke => {
            let settings = load_settings()?;
            let topic = settings
                .output
                .notify_topic_arn
                .clone()
                .ok_or(ConfigError::Missing("NOTIFY_TOPIC_ARN"))?;
            let sdk = aws_sdk_config().await;
            let scraper = LinkedInScraper::new(settings.scraper_options(LaunchProfile::Serverless));
            let notifier = SnsNotifier::new(&sdk, topic);

            let result = handler::handle(
                &scraper,
                &settings.queries(),
                remote_sink(&settings, &sdk),
                &notifier,
            )
            .await;
            println!("{}", serde_json::to_string(&result)?);
            if !result.is_success() {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Keywords { input } => {
            let corpus = keywords::corpus_from_csv(&input)?;
            if corpus.trim().is_empty() {
                println!("No cleaned descriptions in {}", input.display());
                return Ok(());
            }
            for kw in keywords::extract_keywords(&corpus)? {
                println!("{}", kw);
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        info!("Done in {}", format_duration(elapsed));
    }

    result
}

fn load_settings() -> anyhow::Result<Settings> {
    let settings = Settings::load().context("Invalid configuration")?;
    info!(
        chrome = %settings.chrome_executable_path.display(),
        binary = %settings.binary_location.display(),
        max_workers = settings.max_workers,
        slow_mo_s = settings.slow_mo.as_secs(),
        page_load_timeout_s = settings.page_load_timeout.as_secs(),
        job = %settings.job,
        locations = ?settings.locations,
        limit = settings.limit,
        "Loaded configuration"
    );
    Ok(settings)
}

async fn aws_sdk_config() -> SdkConfig {
    aws_config::load_defaults(BehaviorVersion::latest()).await
}

fn remote_sink(settings: &Settings, sdk: &SdkConfig) -> Sink {
    Sink::remote(
        &settings.output.staging_path,
        &settings.output.bucket,
        &settings.output.key,
        Arc::new(S3Store::new(sdk)),
    )
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
