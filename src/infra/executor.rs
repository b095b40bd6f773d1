use std::{future::Future, sync::Arc};

use tokio::sync::{Semaphore, TryAcquireError};

use crate::{config::WorkerConfig, error::service::DispatchError};

/// Bounded pool running dispatched operations on the tokio runtime.
///
/// At most `max_size` operations run at the same time and at most
/// `max_size + queue_capacity` are admitted; further dispatches are rejected
/// right away instead of waiting.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    workers: Arc<Semaphore>,
    admission: Arc<Semaphore>,
    capacity: usize,
}

impl WorkerPool {
    pub fn new(config: &WorkerConfig) -> Self {
        let max_size = config.max_size.clamp(1, Semaphore::MAX_PERMITS);
        let capacity = max_size
            .saturating_add(config.queue_capacity)
            .min(Semaphore::MAX_PERMITS);
        Self {
            workers: Arc::new(Semaphore::new(max_size)),
            admission: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Runs `task` on a worker and waits for its output.
    pub async fn dispatch<F>(&self, task: F) -> Result<F::Output, DispatchError>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let slot = Arc::clone(&self.admission)
            .try_acquire_owned()
            .map_err(|err| match err {
                TryAcquireError::NoPermits => DispatchError::Rejected(self.capacity),
                TryAcquireError::Closed => DispatchError::Closed,
            })?;
        let workers = Arc::clone(&self.workers);

        let handle = tokio::spawn(async move {
            let _slot = slot;
            let _worker = workers
                .acquire_owned()
                .await
                .map_err(|_| DispatchError::Closed)?;
            Ok::<_, DispatchError>(task.await)
        });

        handle.await.map_err(DispatchError::Join)?
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(&WorkerConfig::default())
    }
}
