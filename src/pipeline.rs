use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::collector::Collector;
use crate::crawler::{JobScraper, Query, ScrapeError, ScrapeEvents, ScrapeMetrics};
use crate::error::PipelineError;
use crate::listing::{RawListing, ScrapedListing};
use crate::normalize;
use crate::sink::{Sink, WriteReport};
use crate::table;

/// Event handler for one scraping run: accumulates listings, then cleans,
/// assembles and writes them when the scraper signals the end.
pub struct ListingPipeline {
    collector: Collector,
    sink: Sink,
    rejected: AtomicUsize,
    scrape_errors: AtomicUsize,
    completed: AtomicBool,
    report: Mutex<Option<WriteReport>>,
}

impl ListingPipeline {
    pub fn new(sink: Sink) -> Self {
        Self {
            collector: Collector::new(),
            sink,
            rejected: AtomicUsize::new(0),
            scrape_errors: AtomicUsize::new(0),
            completed: AtomicBool::new(false),
            report: Mutex::new(None),
        }
    }

    /// Listings dropped because a field was missing.
    pub fn rejected(&self) -> usize {
        self.rejected.load(Ordering::Relaxed)
    }

    /// The write report, if the end of the run was reached.
    pub fn into_report(self) -> Option<WriteReport> {
        self.report
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ScrapeEvents for ListingPipeline {
    fn on_listing(&self, raw: RawListing) {
        match ScrapedListing::try_from(raw) {
            Ok(listing) => {
                info!(
                    title = %listing.title,
                    company = %listing.company,
                    date = %listing.date,
                    link = %listing.link,
                    description_len = listing.description.len(),
                    "[ON_DATA]"
                );
                self.collector.record(listing);
            }
            Err(e) => {
                self.rejected.fetch_add(1, Ordering::Relaxed);
                warn!("[ON_DATA] Rejected listing: {}", e);
            }
        }
    }

    fn on_metrics(&self, metrics: &ScrapeMetrics) {
        info!(
            query = %metrics.query,
            location = %metrics.location,
            processed = metrics.processed,
            failed = metrics.failed,
            skipped = metrics.skipped,
            "[ON_METRICS]"
        );
    }

    fn on_error(&self, err: &ScrapeError) {
        self.scrape_errors.fetch_add(1, Ordering::Relaxed);
        error!("[ON_ERROR] {}", err);
    }

    async fn on_complete(&self) -> Result<(), PipelineError> {
        if self.completed.swap(true, Ordering::SeqCst) {
            return Err(PipelineError::AlreadyCompleted);
        }
        info!(
            listings = self.collector.len(),
            rejected = self.rejected(),
            scrape_errors = self.scrape_errors.load(Ordering::Relaxed),
            "[ON_END]"
        );

        let columns = self.collector.take();
        let started = Instant::now();
        let cleaned = normalize::normalize_all(&columns.description);
        debug!(
            rows = cleaned.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "[CLEAN_DESCRIPTION] Descriptions normalized"
        );

        let table = table::assemble(columns, cleaned)?;
        if table.is_empty() {
            warn!("[ON_END] No listings captured, writing header only");
        }
        let report = self.sink.write(&table).await?;

        *self.report.lock().unwrap_or_else(PoisonError::into_inner) = Some(report);
        Ok(())
    }
}

/// Run `queries` through `scraper` and write the resulting table to `sink`.
pub async fn run(scraper: &dyn JobScraper, queries: &[Query], sink: Sink) -> Result<WriteReport> {
    info!(destination = %sink.destination(), queries = queries.len(), "Starting run");
    let pipeline = ListingPipeline::new(sink);
    scraper.run(queries, &pipeline).await?;
    pipeline
        .into_report()
        .context("scraper finished without signalling the end of the run")
}
