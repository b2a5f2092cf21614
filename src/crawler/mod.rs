//! The scraping side of the pipeline.
//!
//! A `JobScraper` drives the browser and reports through `ScrapeEvents`; the
//! pipeline only ever sees those four callbacks.

pub mod linkedin;
pub mod parse;
pub mod query;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::error::PipelineError;
use crate::listing::RawListing;

pub use query::Query;

/// Per-page counters reported while scraping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScrapeMetrics {
    pub query: String,
    pub location: String,
    pub processed: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// A non-fatal scraping failure. Scraping carries on after one.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("[{query} @ {location}] {message}")]
pub struct ScrapeError {
    pub query: String,
    pub location: String,
    pub message: String,
}

/// Callbacks a scraper must invoke. Implementations must tolerate calls from
/// several threads.
#[async_trait]
pub trait ScrapeEvents: Send + Sync {
    /// Once per discovered listing.
    fn on_listing(&self, listing: RawListing);

    fn on_metrics(&self, metrics: &ScrapeMetrics);

    fn on_error(&self, error: &ScrapeError);

    /// Exactly once, after every query finished.
    async fn on_complete(&self) -> Result<(), PipelineError>;
}

#[async_trait]
pub trait JobScraper: Send + Sync {
    /// Run all queries, reporting through `events`. Returns the error from
    /// `on_complete` if the end-of-run step fails.
    async fn run(&self, queries: &[Query], events: &dyn ScrapeEvents) -> Result<()>;
}
