use serde::Serialize;
use tracing::{error, info};

use crate::crawler::{JobScraper, Query};
use crate::notify::Notifier;
use crate::pipeline;
use crate::sink::Sink;

pub const FAILURE_SUBJECT: &str = "LinkedIn Job Scraper Failed";

/// Structured outcome of a hosted invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum InvocationResult {
    Success,
    Failure { detail: String },
}

impl InvocationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, InvocationResult::Success)
    }
}

/// Run the pipeline once. Any failure is published to `notifier` exactly once
/// and returned as a `Failure` result instead of an error.
pub async fn handle(
    scraper: &dyn JobScraper,
    queries: &[Query],
    sink: Sink,
    notifier: &dyn Notifier,
) -> InvocationResult {
    match pipeline::run(scraper, queries, sink).await {
        Ok(report) => {
            info!(rows = report.rows, destination = %report.destination, "Invocation succeeded");
            InvocationResult::Success
        }
        Err(e) => {
            let detail = format!("{:#}", e);
            error!("Invocation failed: {}", detail);
            if let Err(notify_err) = notifier.publish(FAILURE_SUBJECT, &detail).await {
                error!("Failure notification not delivered: {:#}", notify_err);
            }
            InvocationResult::Failure { detail }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::crawler::query::QueryOptions;
    use crate::notify::testing::RecordingNotifier;
    use crate::pipeline::testing::{raw, FakeScraper};
    use crate::sink::testing::FakeStore;

    fn queries() -> Vec<Query> {
        vec![Query::new("Data Scientist", QueryOptions::default())]
    }

    fn scraper() -> FakeScraper {
        FakeScraper::new(vec![raw("Data Scientist", "Train and ship models")])
    }

    #[tokio::test]
    async fn upload_failure_notifies_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FakeStore {
            fail: true,
            ..Default::default()
        });
        let sink = Sink::remote(dir.path().join("staged.csv"), "bucket", "jobs.csv", store);
        let notifier = RecordingNotifier::default();

        let result = handle(&scraper(), &queries(), sink, &notifier).await;

        let InvocationResult::Failure { detail } = &result else {
            panic!("expected failure, got {:?}", result);
        };
        assert!(detail.contains("simulated upload failure"));

        let published = notifier.published.lock().unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, FAILURE_SUBJECT);
        assert_eq!(&published[0].1, detail);
    }

    #[tokio::test]
    async fn success_does_not_notify() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FakeStore::default());
        let sink = Sink::remote(dir.path().join("staged.csv"), "bucket", "jobs.csv", store.clone());
        let notifier = RecordingNotifier::default();

        let result = handle(&scraper(), &queries(), sink, &notifier).await;

        assert!(result.is_success());
        assert!(notifier.published.lock().unwrap().is_empty());
        assert_eq!(store.uploads.lock().unwrap().len(), 1);
    }

    #[test]
    fn result_json_shape() {
        let ok = serde_json::to_value(InvocationResult::Success).unwrap();
        assert_eq!(ok, serde_json::json!({ "status": "success" }));

        let failed = serde_json::to_value(InvocationResult::Failure {
            detail: "boom".into(),
        })
        .unwrap();
        assert_eq!(failed, serde_json::json!({ "status": "failure", "detail": "boom" }));
    }
}
