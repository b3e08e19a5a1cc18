//! Execution contexts for `subscribe_on` and `receive_on`.
//!
//! A [`Scheduler`] only knows how to run a task somewhere. Ordering
//! guarantees are provided by the operators themselves: `receive_on` never
//! has more than one drain task in flight, so even a concurrent pool
//! delivers values one at a time and in order.

use std::sync::Arc;

mod test_scheduler;
#[cfg(feature = "futures-scheduler")]
mod thread_pool_scheduler;
mod thread_scheduler;
#[cfg(feature = "tokio-scheduler")]
mod tokio_scheduler;

pub use test_scheduler::TestScheduler;
pub use thread_scheduler::NewThreadScheduler;

/// A unit of work handed to a scheduler.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs tasks on some execution context.
pub trait Scheduler: Send + Sync + 'static {
  fn schedule(&self, task: Task);
}

impl<S: Scheduler + ?Sized> Scheduler for Arc<S> {
  #[inline]
  fn schedule(&self, task: Task) { (**self).schedule(task) }
}

/// Runs every task inline, on the calling thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImmediateScheduler;

impl Scheduler for ImmediateScheduler {
  #[inline]
  fn schedule(&self, task: Task) { task() }
}

/// Returns a scheduler that creates a new thread for each unit of work.
pub fn new_thread() -> NewThreadScheduler { NewThreadScheduler::default() }
