use futures::executor::ThreadPool;

use super::{Scheduler, Task};

impl Scheduler for ThreadPool {
  fn schedule(&self, task: Task) { self.spawn_ok(async move { task() }); }
}
