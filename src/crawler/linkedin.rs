use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::parse::{self, JobCard};
use super::{JobScraper, Query, ScrapeError, ScrapeEvents, ScrapeMetrics};
use crate::listing::RawListing;

/// Guest search pages list this many results.
const PAGE_SIZE: usize = 25;
const CHANNEL_CAPACITY: usize = 64;
const SERVERLESS_ARGS: [&str; 4] = [
    "--disable-gpu",
    "--single-process",
    "--disable-dev-shm-usage",
    "--no-zygote",
];

/// How the browser is launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchProfile {
    Desktop,
    /// Sandbox off, single process, fixed window. For constrained hosts.
    Serverless,
}

#[derive(Debug, Clone)]
pub struct ScraperOptions {
    pub chrome_path: PathBuf,
    /// Concurrent browsers.
    pub max_workers: usize,
    /// Pause after every navigation.
    pub slow_mo: Duration,
    pub page_load_timeout: Duration,
    pub profile: LaunchProfile,
}

/// Scrapes LinkedIn's public job search with one headless browser per worker.
pub struct LinkedInScraper {
    options: ScraperOptions,
}

enum ScrapeEvent {
    Listing(RawListing),
    Metrics(ScrapeMetrics),
    Error(ScrapeError),
}

/// One (query, location) pair; the unit of work handed to a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Task {
    query: Query,
    location: String,
}

impl Task {
    fn error(&self, message: impl Into<String>) -> ScrapeEvent {
        ScrapeEvent::Error(ScrapeError {
            query: self.query.query.clone(),
            location: self.location.clone(),
            message: message.into(),
        })
    }

    fn metrics(&self) -> ScrapeMetrics {
        ScrapeMetrics {
            query: self.query.query.clone(),
            location: self.location.clone(),
            ..Default::default()
        }
    }
}

fn tasks_for(queries: &[Query]) -> Vec<Task> {
    queries
        .iter()
        .flat_map(|q| {
            q.options.locations.iter().map(move |l| Task {
                query: q.clone(),
                location: l.clone(),
            })
        })
        .collect()
}

impl LinkedInScraper {
    pub fn new(options: ScraperOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl JobScraper for LinkedInScraper {
    async fn run(&self, queries: &[Query], events: &dyn ScrapeEvents) -> Result<()> {
        let tasks = tasks_for(queries);
        info!(
            tasks = tasks.len(),
            workers = self.options.max_workers,
            "Starting scrape"
        );

        let semaphore = Arc::new(Semaphore::new(self.options.max_workers.max(1)));
        let (tx, mut rx) = mpsc::channel::<ScrapeEvent>(CHANNEL_CAPACITY);
        let mut workers = JoinSet::new();

        for task in tasks {
            let sem = Arc::clone(&semaphore);
            let tx = tx.clone();
            let options = self.options.clone();
            workers.spawn(async move {
                let _permit = sem.acquire_owned().await?;
                tokio::task::spawn_blocking(move || scrape_task(&options, &task, &tx)).await?;
                Ok::<_, anyhow::Error>(())
            });
        }

        // rx closes once every worker has dropped its sender
        drop(tx);

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {pos} listings ({per_sec})")?,
        );

        // Events from all workers are delivered one at a time.
        while let Some(event) = rx.recv().await {
            match event {
                ScrapeEvent::Listing(listing) => {
                    pb.inc(1);
                    events.on_listing(listing);
                }
                ScrapeEvent::Metrics(metrics) => events.on_metrics(&metrics),
                ScrapeEvent::Error(error) => events.on_error(&error),
            }
        }
        pb.finish_and_clear();

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined.map_err(anyhow::Error::from).and_then(|r| r) {
                warn!("Worker aborted: {:#}", e);
            }
        }

        events.on_complete().await?;
        Ok(())
    }
}

/// Runs on a blocking thread; every failure is reported as an event.
fn scrape_task(options: &ScraperOptions, task: &Task, tx: &mpsc::Sender<ScrapeEvent>) {
    let emit = |event: ScrapeEvent| {
        let _ = tx.blocking_send(event);
    };

    let browser = match launch_browser(options) {
        Ok(b) => b,
        Err(e) => {
            emit(task.error(format!("browser launch failed: {e:#}")));
            return;
        }
    };

    if let Err(e) = crawl_location(&browser, options, task, &emit) {
        emit(task.error(format!("{e:#}")));
    }
}

fn launch_browser(options: &ScraperOptions) -> Result<Browser> {
    let serverless = options.profile == LaunchProfile::Serverless;
    let args: Vec<&OsStr> = if serverless {
        SERVERLESS_ARGS.iter().map(|a| OsStr::new(*a)).collect()
    } else {
        Vec::new()
    };

    let launch = LaunchOptions::default_builder()
        .headless(true)
        .sandbox(!serverless)
        .window_size(serverless.then_some((1280, 1696)))
        .path(Some(options.chrome_path.clone()))
        .idle_browser_timeout(options.page_load_timeout + options.slow_mo * 2 + Duration::from_secs(30))
        .args(args)
        .build()
        .map_err(|e| anyhow!("invalid browser launch options: {e}"))?;

    Browser::new(launch)
}

fn crawl_location(
    browser: &Browser,
    options: &ScraperOptions,
    task: &Task,
    emit: &dyn Fn(ScrapeEvent),
) -> Result<()> {
    let tab = browser.new_tab()?;
    tab.set_default_timeout(options.page_load_timeout);

    let query_opts = &task.query.options;
    let mut seen: HashSet<String> = HashSet::new();
    let mut emitted = 0;
    let mut start = 0;

    while emitted < query_opts.limit {
        let url = task.query.search_url(&task.location, start)?;
        debug!(%url, "Opening search page");
        let html = load(&tab, url.as_str(), options.slow_mo)?;

        let (fresh, linkless) = fresh_cards(parse::parse_search_results(&html), &mut seen);
        let mut metrics = task.metrics();
        if linkless > 0 {
            metrics.failed += linkless;
            emit(task.error(format!("{linkless} result cards without a link")));
        }
        if fresh.is_empty() {
            debug!(location = %task.location, start, "No new cards, stopping");
            if linkless > 0 {
                emit(ScrapeEvent::Metrics(metrics));
            }
            break;
        }
        start += PAGE_SIZE;

        for (card, link) in fresh {
            if emitted >= query_opts.limit {
                break;
            }
            if query_opts.skip_promoted_jobs && card.promoted {
                metrics.skipped += 1;
                continue;
            }

            match load(&tab, &link, options.slow_mo) {
                Ok(page) => {
                    emit(ScrapeEvent::Listing(card.into_listing(parse::parse_description(&page))));
                    metrics.processed += 1;
                    emitted += 1;
                }
                Err(e) => {
                    metrics.failed += 1;
                    emit(task.error(format!("{link}: {e:#}")));
                }
            }
        }
        emit(ScrapeEvent::Metrics(metrics));
    }

    Ok(())
}

/// Cards with a link not seen before on this task, plus the number of cards
/// that had no link at all. Link-less cards never count as new.
fn fresh_cards(cards: Vec<JobCard>, seen: &mut HashSet<String>) -> (Vec<(JobCard, String)>, usize) {
    let mut linkless = 0;
    let fresh = cards
        .into_iter()
        .filter_map(|card| match card.link.clone() {
            Some(link) => seen.insert(link.clone()).then_some((card, link)),
            None => {
                linkless += 1;
                None
            }
        })
        .collect();
    (fresh, linkless)
}

fn load(tab: &Arc<Tab>, url: &str, slow_mo: Duration) -> Result<String> {
    tab.navigate_to(url)?.wait_until_navigated()?;
    std::thread::sleep(slow_mo);
    tab.get_content()
}
