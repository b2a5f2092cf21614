use thiserror::Error;

/// Startup configuration failures. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("failed to read configuration: {0}")]
    Source(#[from] config::ConfigError),
}

/// A scraped record that cannot become a `ScrapedListing`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("listing is missing field `{0}`")]
    MissingField(&'static str),
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("csv serialization failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("upload to s3://{bucket}/{key} failed: {message}")]
    Upload {
        bucket: String,
        key: String,
        message: String,
    },
}

/// Failures of the end-of-run step (normalize, assemble, write).
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("column `{column}` has {found} rows, expected {expected}")]
    ColumnMismatch {
        column: &'static str,
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error("end of run signalled twice")]
    AlreadyCompleted,
}
