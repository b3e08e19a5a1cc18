use std::{
  sync::atomic::{AtomicUsize, Ordering},
  thread,
};

use super::{Scheduler, Task};

static THREAD_SEQ: AtomicUsize = AtomicUsize::new(0);

/// Spawns one OS thread per scheduled task.
#[derive(Clone, Debug, Default)]
pub struct NewThreadScheduler {
  name_prefix: Option<String>,
}

impl NewThreadScheduler {
  /// Names spawned threads `<prefix>-<n>`.
  pub fn with_name_prefix(prefix: impl Into<String>) -> Self {
    NewThreadScheduler { name_prefix: Some(prefix.into()) }
  }
}

impl Scheduler for NewThreadScheduler {
  fn schedule(&self, task: Task) {
    let mut builder = thread::Builder::new();
    if let Some(prefix) = &self.name_prefix {
      let seq = THREAD_SEQ.fetch_add(1, Ordering::Relaxed);
      builder = builder.name(format!("{prefix}-{seq}"));
    }
    if let Err(err) = builder.spawn(task) {
      tracing::error!(%err, "failed to spawn scheduler thread, task dropped");
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::mpsc::channel;

  use super::*;

  #[rxcombine_macro::test]
  fn runs_on_another_thread() {
    let (tx, rx) = channel();
    let caller = thread::current().id();
    NewThreadScheduler::default().schedule(Box::new(move || {
      tx.send(thread::current().id()).unwrap();
    }));
    let worker = rx.recv().unwrap();
    assert_ne!(worker, caller);
  }

  #[rxcombine_macro::test]
  fn names_threads_with_prefix() {
    let (tx, rx) = channel();
    NewThreadScheduler::with_name_prefix("rx-worker").schedule(Box::new(move || {
      tx.send(thread::current().name().map(str::to_owned)).unwrap();
    }));
    let name = rx.recv().unwrap().unwrap();
    assert!(name.starts_with("rx-worker-"));
  }
}
