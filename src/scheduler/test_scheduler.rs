//! Manually driven scheduler for deterministic tests.
//!
//! Scheduled tasks are queued and only run when the test asks for it, so a
//! test can observe the state between "scheduled" and "executed".
//!
//! ```rust
//! use rxcombine::prelude::*;
//! use std::sync::{Arc, Mutex};
//!
//! let scheduler = TestScheduler::new();
//! let got = Arc::new(Mutex::new(vec![]));
//! let c_got = got.clone();
//! let _c = just(1).receive_on(scheduler.clone()).sink(move |v| c_got.lock().unwrap().push(v));
//!
//! assert!(got.lock().unwrap().is_empty());
//! scheduler.flush();
//! assert_eq!(*got.lock().unwrap(), vec![1]);
//! ```

use std::collections::VecDeque;

use super::{Scheduler, Task};
use crate::rc::MutArc;

#[derive(Clone, Default)]
pub struct TestScheduler {
  queue: MutArc<VecDeque<Task>>,
}

impl TestScheduler {
  pub fn new() -> Self { Self::default() }

  /// Runs the oldest pending task. Returns `false` if nothing was queued.
  pub fn run_next(&self) -> bool {
    let task = self.queue.rc_deref_mut().pop_front();
    match task {
      Some(task) => {
        task();
        true
      }
      None => false,
    }
  }

  /// Runs tasks until the queue is empty, including tasks scheduled by the
  /// tasks being run. Returns how many ran.
  pub fn flush(&self) -> usize {
    let mut ran = 0;
    while self.run_next() {
      ran += 1;
    }
    ran
  }

  pub fn pending_count(&self) -> usize { self.queue.rc_deref_mut().len() }
}

impl Scheduler for TestScheduler {
  fn schedule(&self, task: Task) { self.queue.rc_deref_mut().push_back(task); }
}
