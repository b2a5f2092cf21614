use std::path::PathBuf;
use std::time::Duration;

use config::{Config, Environment};

use crate::crawler::linkedin::{LaunchProfile, ScraperOptions};
use crate::crawler::query::{Query, QueryOptions};
use crate::error::ConfigError;

const DEFAULT_OUTPUT_PATH: &str = "csv_file.csv";
const DEFAULT_STAGING_PATH: &str = "/tmp/csv_file.csv";
const DEFAULT_BUCKET: &str = "nik-jobs-data";
const DEFAULT_KEY: &str = "linkedin_jobs.csv";

/// Everything a run needs, validated up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub chrome_executable_path: PathBuf,
    pub binary_location: PathBuf,
    pub max_workers: usize,
    pub slow_mo: Duration,
    pub page_load_timeout: Duration,
    pub job: String,
    pub locations: Vec<String>,
    pub limit: usize,
    pub output: OutputSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSettings {
    pub csv_path: PathBuf,
    pub staging_path: PathBuf,
    pub bucket: String,
    pub key: String,
    pub notify_topic_arn: Option<String>,
}

impl Settings {
    /// Read `.env` (if present) and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let cfg = Config::builder()
            .add_source(Environment::default())
            .build()?;
        Self::from_config(&cfg)
    }

    pub fn from_config(cfg: &Config) -> Result<Self, ConfigError> {
        let locations: Vec<String> = required(cfg, "LOCATIONS_LIST")?
            .split(',')
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        if locations.is_empty() {
            return Err(invalid("LOCATIONS_LIST", "", "no locations given"));
        }

        let job = required(cfg, "JOB")?.trim().to_string();
        if job.is_empty() {
            return Err(invalid("JOB", "", "must not be empty"));
        }

        Ok(Settings {
            chrome_executable_path: required(cfg, "CHROME_EXECUTABLE_PATH")?.into(),
            binary_location: required(cfg, "BINARY_LOCATION")?.into(),
            max_workers: positive(cfg, "MAX_WORKERS")?,
            slow_mo: Duration::from_secs(number(cfg, "SLOW_MO")?),
            page_load_timeout: Duration::from_secs(positive(cfg, "PAGE_LOAD_TIMEOUT")? as u64),
            job,
            locations,
            limit: positive(cfg, "LIMIT")?,
            output: OutputSettings {
                csv_path: optional(cfg, "OUTPUT_PATH")
                    .unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string())
                    .into(),
                staging_path: optional(cfg, "STAGING_PATH")
                    .unwrap_or_else(|| DEFAULT_STAGING_PATH.to_string())
                    .into(),
                bucket: optional(cfg, "S3_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
                key: optional(cfg, "S3_KEY").unwrap_or_else(|| DEFAULT_KEY.to_string()),
                notify_topic_arn: optional(cfg, "NOTIFY_TOPIC_ARN"),
            },
        })
    }

    /// The single configured search, over every configured location.
    pub fn queries(&self) -> Vec<Query> {
        vec![Query::new(
            self.job.clone(),
            QueryOptions {
                locations: self.locations.clone(),
                limit: self.limit,
                ..Default::default()
            },
        )]
    }

    pub fn scraper_options(&self, profile: LaunchProfile) -> ScraperOptions {
        ScraperOptions {
            chrome_path: self.chrome_executable_path.clone(),
            max_workers: self.max_workers,
            slow_mo: self.slow_mo,
            page_load_timeout: self.page_load_timeout,
            profile,
        }
    }
}

/// The environment source lowercases keys.
fn lookup(cfg: &Config, key: &str) -> Option<String> {
    cfg.get_string(&key.to_lowercase()).ok()
}

fn optional(cfg: &Config, key: &str) -> Option<String> {
    lookup(cfg, key).filter(|v| !v.trim().is_empty())
}

fn required(cfg: &Config, key: &'static str) -> Result<String, ConfigError> {
    optional(cfg, key).ok_or(ConfigError::Missing(key))
}

fn number(cfg: &Config, key: &'static str) -> Result<u64, ConfigError> {
    let raw = required(cfg, key)?;
    raw.trim()
        .parse::<u64>()
        .map_err(|e| invalid(key, &raw, &e.to_string()))
}

fn positive(cfg: &Config, key: &'static str) -> Result<usize, ConfigError> {
    let n = number(cfg, key)?;
    if n == 0 {
        return Err(invalid(key, "0", "must be at least 1"));
    }
    usize::try_from(n).map_err(|e| invalid(key, &n.to_string(), &e.to_string()))
}

fn invalid(key: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
