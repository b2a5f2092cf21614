use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use tracing::info;

use crate::error::SinkError;
use crate::table::ListingTable;

/// Uploads a local file as an object.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_file(&self, path: &Path, bucket: &str, key: &str) -> Result<(), SinkError>;
}

pub struct S3Store {
    client: aws_sdk_s3::Client,
}

impl S3Store {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_s3::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put_file(&self, path: &Path, bucket: &str, key: &str) -> Result<(), SinkError> {
        let upload_err = |message: String| SinkError::Upload {
            bucket: bucket.to_string(),
            key: key.to_string(),
            message,
        };

        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| upload_err(e.to_string()))?;
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type("text/csv")
            .body(body)
            .send()
            .await
            .map_err(|e| upload_err(aws_sdk_s3::error::DisplayErrorContext(e).to_string()))?;
        Ok(())
    }
}

/// Where the finished table goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    LocalFile(PathBuf),
    /// Staged at `staging`, then uploaded as `bucket`/`key`.
    RemoteObject {
        staging: PathBuf,
        bucket: String,
        key: String,
    },
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Destination::LocalFile(path) => write!(f, "{}", path.display()),
            Destination::RemoteObject { bucket, key, .. } => write!(f, "s3://{bucket}/{key}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReport {
    pub rows: usize,
    pub destination: String,
}

#[derive(Clone)]
pub struct Sink {
    destination: Destination,
    store: Option<Arc<dyn ObjectStore>>,
}

impl Sink {
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self {
            destination: Destination::LocalFile(path.into()),
            store: None,
        }
    }

    pub fn remote(
        staging: impl Into<PathBuf>,
        bucket: impl Into<String>,
        key: impl Into<String>,
        store: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            destination: Destination::RemoteObject {
                staging: staging.into(),
                bucket: bucket.into(),
                key: key.into(),
            },
            store: Some(store),
        }
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    /// Replace whatever is at the destination with `table`.
    pub async fn write(&self, table: &ListingTable) -> Result<WriteReport, SinkError> {
        match (&self.destination, &self.store) {
            (Destination::LocalFile(path), _) => {
                table.write_csv_file(path)?;
            }
            (
                Destination::RemoteObject {
                    staging,
                    bucket,
                    key,
                },
                Some(store),
            ) => {
                table.write_csv_file(staging)?;
                info!(staging = %staging.display(), bucket = %bucket, key = %key, "Uploading table");
                store.put_file(staging, bucket, key).await?;
            }
            (Destination::RemoteObject { bucket, key, .. }, None) => {
                return Err(SinkError::Upload {
                    bucket: bucket.clone(),
                    key: key.clone(),
                    message: "no object store configured".to_string(),
                });
            }
        }

        let report = WriteReport {
            rows: table.len(),
            destination: self.destination.to_string(),
        };
        info!(rows = report.rows, destination = %report.destination, "Table written");
        Ok(report)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeStore;
    use super::*;
    use crate::collector::Columns;
    use crate::table::assemble;

    fn table() -> ListingTable {
        let cols = Columns {
            title: vec!["Engineer".into()],
            company: vec!["Acme".into()],
            date: vec!["2023-03-01".into()],
            link: vec!["https://www.linkedin.com/jobs/view/1".into()],
            description: vec!["Build things".into()],
        };
        assemble(cols, vec![vec!["build".into(), "things".into()]]).unwrap()
    }

    #[tokio::test]
    async fn local_write_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "stale content that is much longer than the new table\n".repeat(50))
            .unwrap();

        let report = Sink::local(&path).write(&table()).await.unwrap();
        assert_eq!(report.rows, 1);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(!text.contains("stale"));
        assert_eq!(text.lines().count(), 2);
    }

    #[tokio::test]
    async fn remote_write_stages_then_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let staging = dir.path().join("staged.csv");
        let store = Arc::new(FakeStore::default());

        let sink = Sink::remote(&staging, "bucket", "jobs.csv", store.clone());
        let report = sink.write(&table()).await.unwrap();
        assert_eq!(report.destination, "s3://bucket/jobs.csv");

        let uploads = store.uploads.lock().unwrap();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].0, "bucket");
        assert_eq!(uploads[0].1, "jobs.csv");
        assert!(uploads[0].2.contains("['build', 'things']"));
        assert!(staging.exists());
    }

    #[tokio::test]
    async fn upload_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FakeStore {
            fail: true,
            ..Default::default()
        });
        let sink = Sink::remote(dir.path().join("staged.csv"), "bucket", "jobs.csv", store);
        let err = sink.write(&table()).await.unwrap_err();
        assert!(matches!(err, SinkError::Upload { .. }));
    }
}
