//! Background worker persisting redirect access events.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, error, info};

use crate::domain::access_event::AccessEvent;
use crate::domain::repositories::AccessRepository;
use crate::error::AppError;

/// Retries after the first failed attempt.
const MAX_RETRIES: usize = 3;

/// Consumes access events until every sender is dropped.
///
/// Each event is persisted on its own task; at most `concurrency` writes run at
/// once. Before returning, the worker waits for in-flight writes to finish.
pub async fn run_access_worker<R>(
    mut rx: mpsc::Receiver<AccessEvent>,
    repository: Arc<R>,
    concurrency: usize,
) where
    R: AccessRepository + ?Sized + 'static,
{
    let concurrency = concurrency.max(1);
    let semaphore = Arc::new(Semaphore::new(concurrency));

    while let Some(event) = rx.recv().await {
        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            break;
        };

        let repository = repository.clone();
        tokio::spawn(async move {
            let _permit = permit;
            persist_event(repository.as_ref(), event).await;
        });
    }

    let _ = semaphore.acquire_many(concurrency as u32).await;
    info!("Access worker stopped");
}

/// Persists one event, retrying transient storage failures with backoff.
///
/// Failures are logged and counted; they never propagate.
pub async fn persist_event<R>(repository: &R, event: AccessEvent)
where
    R: AccessRepository + ?Sized,
{
    let new_access = event.to_new_access();

    let strategy = ExponentialBackoff::from_millis(10)
        .max_delay(Duration::from_secs(1))
        .map(jitter)
        .take(MAX_RETRIES);

    let result = RetryIf::start(
        strategy,
        || repository.record(new_access.clone()),
        |e: &AppError| matches!(e, AppError::Internal { .. }),
    )
    .await;

    match result {
        Ok(access) => {
            debug!(
                url_id = access.shortened_url_id,
                code = %event.short_code,
                "Access recorded"
            );
        }
        Err(e) => {
            metrics::counter!("linkshort_access_events_failed_total").increment(1);
            error!(
                url_id = event.url_id,
                code = %event.short_code,
                error = %e,
                "Failed to record access"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::UrlAccess;
    use crate::domain::repositories::MockAccessRepository;
    use chrono::Utc;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn recorded(url_id: i64) -> UrlAccess {
        UrlAccess {
            id: 1,
            shortened_url_id: url_id,
            ip_address: Some("127.0.0.1".to_string()),
            user_agent: None,
            accessed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_worker_records_every_event() {
        let mut mock_repo = MockAccessRepository::new();
        mock_repo
            .expect_record()
            .times(3)
            .returning(|new_access| Ok(recorded(new_access.shortened_url_id)));

        let (tx, rx) = mpsc::channel(10);
        for id in 1..=3 {
            tx.send(AccessEvent::new(
                id,
                "Ab3dE9".to_string(),
                Some("127.0.0.1".to_string()),
                None,
            ))
            .await
            .unwrap();
        }
        drop(tx);

        run_access_worker(rx, Arc::new(mock_repo), 2).await;
    }

    #[tokio::test]
    async fn test_persist_event_retries_internal_errors() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();

        let mut mock_repo = MockAccessRepository::new();
        mock_repo.expect_record().times(2).returning(move |new_access| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(AppError::internal("Database error", json!({})))
            } else {
                Ok(recorded(new_access.shortened_url_id))
            }
        });

        persist_event(
            &mock_repo,
            AccessEvent::new(5, "Ab3dE9".to_string(), None, None),
        )
        .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_persist_event_does_not_retry_non_transient_errors() {
        let mut mock_repo = MockAccessRepository::new();
        mock_repo
            .expect_record()
            .times(1)
            .returning(|_| Err(AppError::conflict("Unique constraint violation", json!({}))));

        persist_event(
            &mock_repo,
            AccessEvent::new(5, "Ab3dE9".to_string(), None, None),
        )
        .await;
    }

    #[tokio::test]
    async fn test_persist_event_gives_up_after_max_retries() {
        let mut mock_repo = MockAccessRepository::new();
        mock_repo
            .expect_record()
            .times(MAX_RETRIES + 1)
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        persist_event(
            &mock_repo,
            AccessEvent::new(5, "Ab3dE9".to_string(), None, None),
        )
        .await;
    }
}
