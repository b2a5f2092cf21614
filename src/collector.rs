use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::listing::ScrapedListing;

/// Five row-aligned columns in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Columns {
    pub title: Vec<String>,
    pub company: Vec<String>,
    pub date: Vec<String>,
    pub link: Vec<String>,
    pub description: Vec<String>,
}

impl Columns {
    pub fn len(&self) -> usize {
        self.title.len()
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
    }
}

/// Accumulates listings for one scraping run.
///
/// Appends happen under a single lock so that listings delivered from several
/// worker threads never interleave across columns.
#[derive(Debug, Default)]
pub struct Collector {
    columns: Mutex<Columns>,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, listing: ScrapedListing) {
        let mut cols = self.lock();
        cols.title.push(listing.title);
        cols.company.push(listing.company);
        cols.date.push(listing.date);
        cols.link.push(listing.link);
        cols.description.push(listing.description);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Move the accumulated columns out, leaving the collector empty.
    pub fn take(&self) -> Columns {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Columns> {
        self.columns.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
