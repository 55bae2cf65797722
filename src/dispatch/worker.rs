use super::Completion;
use crate::config::{DispatchConfig, MAX_WORKER_THREADS};
use crate::core::types::{MemoryError, MemoryResult};
use lazy_static::lazy_static;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, PoisonError};
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::sync::oneshot;
use tracing::{debug, warn};

const WORKER_THREAD_NAME: &str = "procmem-worker";

/// Shared pool for callers outside any tokio runtime
struct WorkerPool {
    threads: usize,
    runtime: Option<Runtime>,
}

lazy_static! {
    static ref WORKERS: Mutex<WorkerPool> = Mutex::new(WorkerPool {
        threads: DispatchConfig::default().worker_threads,
        runtime: None,
    });
}

/// Sets the size of the process-wide worker pool
///
/// Only takes effect before the first deferred operation runs outside a
/// tokio runtime. Returns `false` when the pool already exists.
pub fn configure_workers(config: &DispatchConfig) -> bool {
    let mut pool = WORKERS.lock().unwrap_or_else(PoisonError::into_inner);
    if pool.runtime.is_some() {
        warn!(
            worker_threads = config.worker_threads,
            "Worker pool already started; ignoring new size"
        );
        return false;
    }
    pool.threads = config.worker_threads.clamp(1, MAX_WORKER_THREADS);
    true
}

/// Runs `op` on a worker and returns its completion
pub fn dispatch<T, F>(op: F) -> Completion<T>
where
    T: Send + 'static,
    F: FnOnce() -> MemoryResult<T> + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    match blocking_handle() {
        Ok(handle) => {
            handle.spawn_blocking(move || {
                // The receiver may have been dropped; nothing to report then
                let _ = tx.send(run_guarded(op));
            });
        }
        Err(e) => {
            let _ = tx.send(Err(e));
        }
    }
    Completion::new(rx)
}

/// Runs `op` on a worker and hands its result to `callback` there
pub fn dispatch_with_callback<T, F, C>(op: F, callback: C)
where
    T: Send + 'static,
    F: FnOnce() -> MemoryResult<T> + Send + 'static,
    C: FnOnce(MemoryResult<T>) + Send + 'static,
{
    match blocking_handle() {
        Ok(handle) => {
            handle.spawn_blocking(move || callback(run_guarded(op)));
        }
        Err(e) => callback(Err(e)),
    }
}

/// The caller's runtime if there is one, otherwise the shared worker pool
fn blocking_handle() -> MemoryResult<Handle> {
    if let Ok(handle) = Handle::try_current() {
        return Ok(handle);
    }

    let mut pool = WORKERS.lock().unwrap_or_else(PoisonError::into_inner);
    let runtime = match pool.runtime.take() {
        Some(runtime) => runtime,
        None => build_workers(pool.threads)?,
    };
    let handle = runtime.handle().clone();
    pool.runtime = Some(runtime);
    Ok(handle)
}

fn build_workers(threads: usize) -> MemoryResult<Runtime> {
    debug!(threads, "Starting worker pool");

    Builder::new_multi_thread()
        .worker_threads(1)
        .max_blocking_threads(threads)
        .thread_name(WORKER_THREAD_NAME)
        .enable_all()
        .build()
        .map_err(|e| MemoryError::DispatchFailed(format!("failed to start worker pool: {}", e)))
}

fn run_guarded<T>(op: impl FnOnce() -> MemoryResult<T>) -> MemoryResult<T> {
    panic::catch_unwind(AssertUnwindSafe(op)).unwrap_or_else(|payload| {
        Err(MemoryError::DispatchFailed(format!(
            "worker panicked: {}",
            panic_message(payload.as_ref())
        )))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}
