//! Operation completion tracking
//!
//! A mutating control-plane call returns a batch of in-flight
//! [`Operation`]s. [`wait_unfinished`] blocks until every one of them
//! has been observed in a terminal status, polling each operation from
//! its own task and joining on the whole batch.

use crate::error::{OpsError, Result};
use oxbow_api::models::Operation;
use oxbow_api::OperationSource;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::sleep;

/// Tuning for [`wait_unfinished`]
#[derive(Debug, Clone)]
pub struct WaitConfig {
    /// Fixed wait between status polls of one operation
    pub poll_interval: Duration,

    /// Consecutive failed polls tolerated per operation before the wait
    /// fails with [`OpsError::PollingFailed`]. A successful poll resets
    /// the count.
    pub failure_budget: u32,

    /// Cap on concurrently polling watcher tasks
    pub max_concurrent: usize,

    /// Overall deadline for the whole batch, if any
    pub timeout: Option<Duration>,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            failure_budget: 5,
            max_concurrent: 16,
            timeout: None,
        }
    }
}

/// Block until every operation in the batch is terminal.
///
/// Operations already terminal are skipped without touching `source`.
/// Each pending operation is polled independently; no ordering between
/// them is promised. The call returns `Ok(())` only after every watcher
/// has observed a terminal status at least once.
pub async fn wait_unfinished<S>(
    source: Arc<S>,
    operations: Vec<Operation>,
    config: &WaitConfig,
) -> Result<()>
where
    S: OperationSource + ?Sized + 'static,
{
    let pending: Vec<Operation> = operations
        .into_iter()
        .filter(|op| !op.status.is_terminal())
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    tracing::debug!("waiting for {} unfinished operations", pending.len());

    match config.timeout {
        Some(limit) => match tokio::time::timeout(limit, track(source, pending, config)).await {
            Ok(result) => result,
            Err(_) => Err(OpsError::Timeout(limit)),
        },
        None => track(source, pending, config).await,
    }
}

/// Fan out one watcher per operation and join the whole batch.
///
/// All watchers run to completion even when one fails; the first
/// failure observed is the one surfaced.
async fn track<S>(source: Arc<S>, pending: Vec<Operation>, config: &WaitConfig) -> Result<()>
where
    S: OperationSource + ?Sized + 'static,
{
    let semaphore = Arc::new(Semaphore::new(config.max_concurrent.max(1)));
    let mut watchers = JoinSet::new();

    for operation in pending {
        let source = source.clone();
        let semaphore = semaphore.clone();
        let interval = config.poll_interval;
        let budget = config.failure_budget;
        watchers.spawn(async move {
            // The semaphore is never closed, so acquisition only waits.
            let _permit = semaphore.acquire_owned().await.ok();
            watch(source.as_ref(), operation, interval, budget).await
        });
    }

    let mut first_error = None;
    while let Some(joined) = watchers.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                tracing::warn!("operation watcher failed: {}", err);
                first_error.get_or_insert(err);
            }
            Err(err) => {
                if err.is_panic() {
                    std::panic::resume_unwind(err.into_panic());
                }
            }
        }
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Poll one operation until it reports a terminal status.
async fn watch<S>(source: &S, operation: Operation, interval: Duration, budget: u32) -> Result<()>
where
    S: OperationSource + ?Sized,
{
    let mut status = operation.status;
    let mut consecutive_failures: u32 = 0;

    while !status.is_terminal() {
        sleep(interval).await;

        match source
            .get_operation(&operation.project_id, &operation.id)
            .await
        {
            Ok(current) => {
                consecutive_failures = 0;
                status = current.status;
                tracing::debug!("operation {} is {}", operation.id, status);
            }
            Err(err) => {
                consecutive_failures += 1;
                if consecutive_failures >= budget {
                    return Err(OpsError::PollingFailed {
                        operation_id: operation.id,
                        attempts: consecutive_failures,
                        source: err,
                    });
                }
                tracing::warn!(
                    "failed to poll operation {} ({}/{}): {}",
                    operation.id,
                    consecutive_failures,
                    budget,
                    err
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use oxbow_api::models::OperationStatus;
    use oxbow_api::ApiError;
    use std::collections::HashMap;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    fn operation(id: &str, status: OperationStatus) -> Operation {
        Operation {
            id: id.to_string(),
            project_id: "proj-1".to_string(),
            branch_id: None,
            action: None,
            status,
            created_at: None,
            updated_at: None,
        }
    }

    /// Scripted status provider: pops one response per poll, then keeps
    /// reporting `finished`. `Err(status)` entries become HTTP errors.
    struct ScriptedSource {
        scripts: Mutex<HashMap<String, VecDeque<std::result::Result<OperationStatus, u16>>>>,
        calls: Mutex<HashMap<String, u32>>,
    }

    impl ScriptedSource {
        fn new() -> Self {
            Self {
                scripts: Mutex::new(HashMap::new()),
                calls: Mutex::new(HashMap::new()),
            }
        }

        fn script(
            self,
            id: &str,
            responses: Vec<std::result::Result<OperationStatus, u16>>,
        ) -> Self {
            self.scripts
                .lock()
                .unwrap()
                .insert(id.to_string(), responses.into());
            self
        }

        fn calls_for(&self, id: &str) -> u32 {
            self.calls.lock().unwrap().get(id).copied().unwrap_or(0)
        }
    }

    #[async_trait]
    impl OperationSource for ScriptedSource {
        async fn get_operation(
            &self,
            project_id: &str,
            operation_id: &str,
        ) -> oxbow_api::Result<Operation> {
            *self
                .calls
                .lock()
                .unwrap()
                .entry(operation_id.to_string())
                .or_insert(0) += 1;

            let next = self
                .scripts
                .lock()
                .unwrap()
                .get_mut(operation_id)
                .and_then(|queue| queue.pop_front())
                .unwrap_or(Ok(OperationStatus::Finished));

            match next {
                Ok(status) => Ok(Operation {
                    id: operation_id.to_string(),
                    project_id: project_id.to_string(),
                    branch_id: None,
                    action: None,
                    status,
                    created_at: None,
                    updated_at: None,
                }),
                Err(status) => Err(ApiError::Http {
                    status,
                    message: format!("status {status}"),
                }),
            }
        }
    }

    fn fast_config() -> WaitConfig {
        WaitConfig {
            poll_interval: Duration::from_millis(1),
            ..WaitConfig::default()
        }
    }

    #[tokio::test]
    async fn test_terminal_batch_returns_without_polling() {
        let source = Arc::new(ScriptedSource::new());

        let result = wait_unfinished(
            source.clone(),
            vec![
                operation("op-0", OperationStatus::Finished),
                operation("op-1", OperationStatus::Failed),
                operation("op-2", OperationStatus::Other),
            ],
            &fast_config(),
        )
        .await;

        assert!(result.is_ok());
        assert_eq!(source.calls_for("op-0"), 0);
        assert_eq!(source.calls_for("op-1"), 0);
        assert_eq!(source.calls_for("op-2"), 0);
    }

    #[tokio::test]
    async fn test_empty_batch_is_a_no_op() {
        let source = Arc::new(ScriptedSource::new());
        let result = wait_unfinished(source, Vec::new(), &fast_config()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_mixed_batch_polls_only_pending_operations() {
        let source = Arc::new(
            ScriptedSource::new()
                .script(
                    "op-1",
                    vec![Ok(OperationStatus::Running), Ok(OperationStatus::Finished)],
                )
                .script(
                    "op-2",
                    vec![
                        Ok(OperationStatus::Scheduling),
                        Ok(OperationStatus::Finished),
                    ],
                ),
        );

        let result = wait_unfinished(
            source.clone(),
            vec![
                operation("op-0", OperationStatus::Finished),
                operation("op-1", OperationStatus::Running),
                operation("op-2", OperationStatus::Scheduling),
            ],
            &fast_config(),
        )
        .await;

        assert!(result.is_ok());
        // Terminal on arrival: never polled. Each pending operation is
        // polled once while still pending and once observing terminal.
        assert_eq!(source.calls_for("op-0"), 0);
        assert_eq!(source.calls_for("op-1"), 2);
        assert_eq!(source.calls_for("op-2"), 2);
    }

    #[tokio::test]
    async fn test_failed_status_counts_as_terminal() {
        let source =
            Arc::new(ScriptedSource::new().script("op-1", vec![Ok(OperationStatus::Failed)]));

        let result = wait_unfinished(
            source.clone(),
            vec![operation("op-1", OperationStatus::Running)],
            &fast_config(),
        )
        .await;

        assert!(result.is_ok());
        assert_eq!(source.calls_for("op-1"), 1);
    }

    #[tokio::test]
    async fn test_polling_failure_budget_exhausts() {
        let source = Arc::new(ScriptedSource::new().script(
            "op-1",
            vec![Err(500), Err(500), Err(500), Err(500), Err(500), Err(500)],
        ));
        let config = WaitConfig {
            poll_interval: Duration::from_millis(1),
            failure_budget: 3,
            ..WaitConfig::default()
        };

        let result = wait_unfinished(
            source.clone(),
            vec![operation("op-1", OperationStatus::Running)],
            &config,
        )
        .await;

        match result {
            Err(OpsError::PollingFailed {
                operation_id,
                attempts,
                ..
            }) => {
                assert_eq!(operation_id, "op-1");
                assert_eq!(attempts, 3);
            }
            other => panic!("expected PollingFailed, got: {other:?}"),
        }
        assert_eq!(source.calls_for("op-1"), 3);
    }

    #[tokio::test]
    async fn test_successful_poll_resets_failure_budget() {
        let source = Arc::new(ScriptedSource::new().script(
            "op-1",
            vec![
                Err(500),
                Err(500),
                Ok(OperationStatus::Running),
                Err(500),
                Err(500),
                Ok(OperationStatus::Finished),
            ],
        ));
        let config = WaitConfig {
            poll_interval: Duration::from_millis(1),
            failure_budget: 3,
            ..WaitConfig::default()
        };

        let result = wait_unfinished(
            source.clone(),
            vec![operation("op-1", OperationStatus::Scheduling)],
            &config,
        )
        .await;

        assert!(result.is_ok());
        assert_eq!(source.calls_for("op-1"), 6);
    }

    #[tokio::test]
    async fn test_one_failing_watcher_does_not_abort_the_rest() {
        let source = Arc::new(
            ScriptedSource::new()
                .script("op-bad", vec![Err(500), Err(500)])
                .script(
                    "op-good",
                    vec![Ok(OperationStatus::Running), Ok(OperationStatus::Finished)],
                ),
        );
        let config = WaitConfig {
            poll_interval: Duration::from_millis(1),
            failure_budget: 2,
            ..WaitConfig::default()
        };

        let result = wait_unfinished(
            source.clone(),
            vec![
                operation("op-bad", OperationStatus::Running),
                operation("op-good", OperationStatus::Running),
            ],
            &config,
        )
        .await;

        match result {
            Err(OpsError::PollingFailed { operation_id, .. }) => {
                assert_eq!(operation_id, "op-bad");
            }
            other => panic!("expected PollingFailed, got: {other:?}"),
        }
        // The healthy watcher ran to terminal despite the failure.
        assert_eq!(source.calls_for("op-good"), 2);
    }

    // Paused time: the runtime advances the clock instead of sleeping,
    // so realistic intervals run instantly and deterministically.
    #[tokio::test(start_paused = true)]
    async fn test_deadline_bounds_the_wait() {
        // Never reaches a terminal status.
        let source = Arc::new(ScriptedSource::new().script(
            "op-1",
            std::iter::repeat(Ok(OperationStatus::Running)).take(10_000).collect(),
        ));
        let config = WaitConfig {
            poll_interval: Duration::from_secs(1),
            timeout: Some(Duration::from_secs(30)),
            ..WaitConfig::default()
        };

        let result = wait_unfinished(
            source,
            vec![operation("op-1", OperationStatus::Running)],
            &config,
        )
        .await;

        assert!(matches!(result, Err(OpsError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_concurrency_cap_still_finishes_the_batch() {
        let mut operations = Vec::new();
        let mut source = ScriptedSource::new();
        for i in 0..8 {
            let id = format!("op-{i}");
            source = source.script(
                &id,
                vec![Ok(OperationStatus::Running), Ok(OperationStatus::Finished)],
            );
            operations.push(operation(&id, OperationStatus::Scheduling));
        }
        let source = Arc::new(source);
        let config = WaitConfig {
            poll_interval: Duration::from_millis(1),
            max_concurrent: 2,
            ..WaitConfig::default()
        };

        let result = wait_unfinished(source.clone(), operations, &config).await;

        assert!(result.is_ok());
        for i in 0..8 {
            assert_eq!(source.calls_for(&format!("op-{i}")), 2);
        }
    }
}
