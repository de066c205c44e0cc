//! Single-flight scan supervision.
//!
//! At most one scan task runs at a time. The in-memory join handle is the
//! source of truth for liveness; the persisted scan-control flags mirror
//! each transition so external observers can read the last known state.
//! Stop is cooperative: the pipeline polls the stop signal at its safe
//! points and winds down on its own schedule.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::models::ScanStatus;
use crate::repository::ScanStateRepository;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("scan is already running")]
    AlreadyRunning,
    #[error("no scan is currently running")]
    NotRunning,
    #[error(transparent)]
    Database(#[from] crate::repository::DieselError),
}

/// Shared cooperative stop flag handed to the running scan task.
#[derive(Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Supervises the one background scan task.
pub struct ScanController {
    task: Mutex<Option<JoinHandle<()>>>,
    stop: StopSignal,
    scan_state: ScanStateRepository,
}

impl ScanController {
    pub fn new(scan_state: ScanStateRepository) -> Self {
        Self {
            task: Mutex::new(None),
            stop: StopSignal::new(),
            scan_state,
        }
    }

    /// Launch a scan task built by `factory`, which receives the stop
    /// signal the task must poll. Fails when a scan is already live.
    pub async fn start<F, Fut>(&self, factory: F) -> Result<(), ScanError>
    where
        F: FnOnce(StopSignal) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut task = self.task.lock().await;

        if let Some(handle) = task.as_ref() {
            if !handle.is_finished() {
                return Err(ScanError::AlreadyRunning);
            }
        }

        self.stop.reset();
        self.scan_state.set_stop_requested(false).await?;
        self.scan_state.set_active(true).await?;

        let scan = factory(self.stop.clone());
        let stop = self.stop.clone();
        let scan_state = self.scan_state.clone();
        let handle = tokio::spawn(async move {
            scan.await;
            stop.reset();
            if let Err(err) = scan_state.set_active(false).await {
                warn!(error = %err, "failed to clear persisted scan-active flag");
            }
            if let Err(err) = scan_state.set_stop_requested(false).await {
                warn!(error = %err, "failed to clear persisted stop flag");
            }
            info!("scan task finished");
        });

        *task = Some(handle);
        info!("scan task started");
        Ok(())
    }

    /// Request a cooperative stop. Returns immediately; the scan winds
    /// down at its next safe point.
    pub async fn stop(&self) -> Result<(), ScanError> {
        let task = self.task.lock().await;

        match task.as_ref() {
            Some(handle) if !handle.is_finished() => {
                self.stop.request_stop();
                self.scan_state.set_stop_requested(true).await?;
                info!("scan stop requested");
                Ok(())
            }
            _ => Err(ScanError::NotRunning),
        }
    }

    /// Current liveness and pending-stop state.
    pub async fn status(&self) -> ScanStatus {
        let task = self.task.lock().await;
        let is_running = task.as_ref().is_some_and(|h| !h.is_finished());
        ScanStatus {
            is_running,
            stop_requested: is_running && self.stop.is_stop_requested(),
        }
    }

    /// Block until the current scan finishes or the timeout elapses.
    /// Returns true when no scan remains running afterwards.
    ///
    /// Polls instead of awaiting the join handle so the task mutex is
    /// only held for the liveness check; status and stop stay responsive
    /// while a waiter is parked here.
    pub async fn wait_for_completion(&self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            {
                let mut task = self.task.lock().await;
                match task.as_ref() {
                    None => return true,
                    Some(handle) if handle.is_finished() => {
                        *task = None;
                        return true;
                    }
                    Some(_) => {}
                }
            }

            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{run_migrations, AsyncSqlitePool};
    use tempfile::TempDir;

    async fn controller() -> (Arc<ScanController>, TempDir) {
        let dir = TempDir::new().unwrap();
        let url = dir.path().join("test.db").display().to_string();
        run_migrations(&url).await.unwrap();
        let scan_state = ScanStateRepository::new(AsyncSqlitePool::new(&url));
        (Arc::new(ScanController::new(scan_state)), dir)
    }

    #[tokio::test]
    async fn start_rejects_concurrent_scans() {
        let (controller, _dir) = controller().await;

        controller
            .start(|stop| async move {
                while !stop.is_stop_requested() {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            })
            .await
            .unwrap();

        let second = controller.start(|_| async {}).await;
        assert!(matches!(second, Err(ScanError::AlreadyRunning)));

        controller.stop().await.unwrap();
        assert!(controller.wait_for_completion(Duration::from_secs(5)).await);
    }

    #[tokio::test]
    async fn stop_without_scan_is_an_error() {
        let (controller, _dir) = controller().await;
        assert!(matches!(controller.stop().await, Err(ScanError::NotRunning)));
    }

    #[tokio::test]
    async fn status_reflects_lifecycle() {
        let (controller, _dir) = controller().await;

        let status = controller.status().await;
        assert!(!status.is_running);
        assert!(!status.stop_requested);

        controller
            .start(|stop| async move {
                while !stop.is_stop_requested() {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            })
            .await
            .unwrap();

        let status = controller.status().await;
        assert!(status.is_running);
        assert!(!status.stop_requested);

        controller.stop().await.unwrap();
        let status = controller.status().await;
        assert!(status.stop_requested || !status.is_running);

        assert!(controller.wait_for_completion(Duration::from_secs(5)).await);
        let status = controller.status().await;
        assert!(!status.is_running);
        assert!(!status.stop_requested);
    }

    #[tokio::test]
    async fn completed_scan_allows_restart() {
        let (controller, _dir) = controller().await;

        controller.start(|_| async {}).await.unwrap();
        assert!(controller.wait_for_completion(Duration::from_secs(5)).await);

        controller.start(|_| async {}).await.unwrap();
        assert!(controller.wait_for_completion(Duration::from_secs(5)).await);
    }

    #[tokio::test]
    async fn transitions_mirror_to_persisted_flags() {
        let (controller, _dir) = controller().await;

        controller
            .start(|stop| async move {
                while !stop.is_stop_requested() {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            })
            .await
            .unwrap();
        assert_eq!(controller.scan_state.flags().await.unwrap(), (false, true));

        controller.stop().await.unwrap();
        assert_eq!(controller.scan_state.flags().await.unwrap().0, true);

        assert!(controller.wait_for_completion(Duration::from_secs(5)).await);
        // Task wrapper clears both flags as it exits
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(controller.scan_state.flags().await.unwrap(), (false, false));
    }

    #[tokio::test]
    async fn status_and_stop_respond_while_a_waiter_is_parked() {
        let (controller, _dir) = controller().await;

        controller
            .start(|stop| async move {
                while !stop.is_stop_requested() {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            })
            .await
            .unwrap();

        let waiter = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.wait_for_completion(Duration::from_secs(5)).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        let status = tokio::time::timeout(Duration::from_millis(500), controller.status())
            .await
            .expect("status blocked behind the waiter");
        assert!(status.is_running);

        tokio::time::timeout(Duration::from_millis(500), controller.stop())
            .await
            .expect("stop blocked behind the waiter")
            .unwrap();

        assert!(waiter.await.unwrap());
    }

    #[tokio::test]
    async fn wait_for_completion_times_out() {
        let (controller, _dir) = controller().await;

        controller
            .start(|stop| async move {
                while !stop.is_stop_requested() {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            })
            .await
            .unwrap();

        assert!(!controller.wait_for_completion(Duration::from_millis(50)).await);

        controller.stop().await.unwrap();
        assert!(controller.wait_for_completion(Duration::from_secs(5)).await);
    }
}
