use std::sync::Arc;
use std::thread::JoinHandle;

use crate::error::Result;
use crate::registry::ActionRegistry;
use crate::worker::Worker;

/// Fixed set of threads, each running one pool [`Worker`] against a shared
/// registry until the registry reports shutdown.
pub struct WorkerPool {
    registry: Arc<ActionRegistry>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn start(registry: Arc<ActionRegistry>, threads: usize) -> Result<Self> {
        let mut pool = Self {
            registry,
            handles: Vec::with_capacity(threads.max(1)),
        };
        for index in 0..threads.max(1) {
            let registry = Arc::clone(&pool.registry);
            let spawned = std::thread::Builder::new()
                .name(format!("maintenance-worker-{index}"))
                .spawn(move || {
                    tracing::debug!(worker = index, "maintenance worker started");
                    let mut worker = Worker::new(&*registry);
                    worker.run();
                    tracing::debug!(worker = index, "maintenance worker stopped");
                });
            match spawned {
                Ok(handle) => pool.handles.push(handle),
                Err(e) => {
                    tracing::error!(worker = index, error = %e, "failed to spawn maintenance worker");
                    pool.stop();
                    return Err(e.into());
                }
            }
        }
        tracing::info!(threads = pool.handles.len(), "maintenance worker pool started");
        Ok(pool)
    }

    pub fn size(&self) -> usize {
        self.handles.len()
    }

    pub fn registry(&self) -> &Arc<ActionRegistry> {
        &self.registry
    }

    /// Request shutdown and wait for every worker to finish its current step.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if self.handles.is_empty() {
            return;
        }
        self.registry.begin_shutdown();
        for handle in self.handles.drain(..) {
            let name = handle.thread().name().unwrap_or("maintenance-worker").to_string();
            if handle.join().is_err() {
                tracing::error!(thread = %name, "maintenance worker panicked");
            }
        }
        tracing::info!("maintenance worker pool stopped");
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.stop();
    }
}
