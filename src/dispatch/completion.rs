use crate::core::types::{MemoryError, MemoryResult};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::runtime::Handle;
use tokio::sync::oneshot;

/// Pending result of a deferred operation
///
/// Await it from async code, or call [`wait`](Completion::wait) from a
/// plain thread.
#[must_use = "a completion does nothing unless awaited or waited on"]
pub struct Completion<T> {
    rx: oneshot::Receiver<MemoryResult<T>>,
}

impl<T> Completion<T> {
    pub(crate) fn new(rx: oneshot::Receiver<MemoryResult<T>>) -> Self {
        Completion { rx }
    }

    /// Completion that already holds `result`
    pub fn ready(result: MemoryResult<T>) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(result);
        Completion { rx }
    }

    /// Blocks the current thread until the operation finishes
    ///
    /// Inside an async runtime this returns `DispatchFailed` without
    /// blocking; await the completion there instead.
    pub fn wait(self) -> MemoryResult<T> {
        if Handle::try_current().is_ok() {
            return Err(MemoryError::DispatchFailed(
                "wait() called inside an async runtime; await the completion instead".to_string(),
            ));
        }
        self.rx.blocking_recv().unwrap_or_else(|_| Err(abandoned()))
    }
}

impl<T> Future for Completion<T> {
    type Output = MemoryResult<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or_else(|_| Err(abandoned())))
    }
}

fn abandoned() -> MemoryError {
    MemoryError::DispatchFailed("worker dropped the operation".to_string())
}
