//! Task executor: runs background tasks with bounded concurrency.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use lamus_core::config::worker::WorkerConfig;
use lamus_core::error::{AppError, ErrorKind};
use lamus_core::result::AppResult;

/// Spawns tasks on the Tokio runtime, at most `concurrency` running at once.
#[derive(Debug, Clone)]
pub struct TaskExecutor {
    /// Permits for running tasks
    semaphore: Arc<Semaphore>,
    /// Configured concurrency
    concurrency: usize,
}

impl TaskExecutor {
    /// Create an executor from the worker configuration
    pub fn new(config: &WorkerConfig) -> Self {
        let concurrency = config.concurrency.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(concurrency)),
            concurrency,
        }
    }

    /// Spawn `task`; it starts once a slot is free
    pub fn submit<F, T>(&self, name: &'static str, task: F) -> JoinHandle<AppResult<T>>
    where
        F: Future<Output = AppResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        let semaphore = Arc::clone(&self.semaphore);
        tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await.map_err(|e| {
                AppError::with_source(ErrorKind::Internal, "Task executor is closed", e)
            })?;
            tracing::debug!(task = name, "Task started");
            let result = task.await;
            tracing::debug!(task = name, ok = result.is_ok(), "Task finished");
            result
        })
    }

    /// Number of tasks that could start right now
    pub fn available_slots(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Configured concurrency
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }
}
