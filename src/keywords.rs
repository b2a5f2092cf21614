use std::fmt;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use itertools::Itertools;
use yake_rust::{get_n_best, Config, StopWords};

use crate::table::read_csv_file;

const LANGUAGE: &str = "en";
const MAX_NGRAM: usize = 2;
const DEDUPLICATION_THRESHOLD: f64 = 0.1;
const TOP_N: usize = 20;

/// A candidate phrase. Lower scores are more significant.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyword {
    pub phrase: String,
    pub score: f64,
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "('{}', {})", self.phrase, self.score)
    }
}

/// Top keywords of `text`, most significant (lowest score) first.
pub fn extract_keywords(text: &str) -> Result<Vec<Keyword>> {
    let stopwords = StopWords::predefined(LANGUAGE)
        .ok_or_else(|| anyhow!("no stopword list for language {:?}", LANGUAGE))?;
    let config = Config {
        ngrams: MAX_NGRAM,
        deduplication_threshold: DEDUPLICATION_THRESHOLD,
        ..Config::default()
    };

    let keywords = get_n_best(TOP_N, text, &stopwords, &config)
        .into_iter()
        .map(|item| Keyword {
            phrase: item.raw,
            score: item.score,
        })
        .sorted_by(|a, b| a.score.total_cmp(&b.score))
        .collect();
    Ok(keywords)
}

/// Every `description_cleaned` value of a written table, space-joined.
pub fn corpus_from_csv(path: &Path) -> Result<String> {
    let records = read_csv_file(path)
        .with_context(|| format!("Failed to read table {}", path.display()))?;
    Ok(records
        .iter()
        .map(|r| r.description_cleaned.as_str())
        .join(" "))
}
