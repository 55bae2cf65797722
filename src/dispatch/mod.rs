//! Deferred execution of engine operations
//!
//! Work runs on the blocking pool of the caller's tokio runtime when there
//! is one, otherwise on a shared worker pool started on first use. Results
//! come back through a [`Completion`] or a callback. There is no ordering
//! between separate calls and no cancellation.

mod completion;
mod worker;

pub use completion::Completion;
pub use worker::{configure_workers, dispatch, dispatch_with_callback};
