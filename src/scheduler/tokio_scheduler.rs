use tokio::runtime::Handle;

use super::{Scheduler, Task};

impl Scheduler for Handle {
  fn schedule(&self, task: Task) {
    // Blocking subscriber callbacks must not stall the async workers.
    self.spawn_blocking(task);
  }
}
