use std::{
  fmt::{Debug, Formatter},
  hash::{Hash, Hasher},
  sync::atomic::{AtomicUsize, Ordering},
};

use super::Subscription;

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

/// An RAII handle to an active subscription.
///
/// Calling [`cancel`](AnyCancellable::cancel) or dropping the handle stops
/// further delivery and tears the chain down. Cancelling twice is a no-op.
///
/// If you want to keep a subscription alive for as long as some owner
/// lives, [`store`](AnyCancellable::store) it into a collection held by that
/// owner.
#[must_use]
pub struct AnyCancellable {
  id: usize,
  cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl AnyCancellable {
  pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
    AnyCancellable {
      id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
      cancel: Some(Box::new(cancel)),
    }
  }

  /// Cancels the subscription when the handle is cancelled or dropped.
  pub fn from_subscription<S>(subscription: S) -> Self
  where
    S: Subscription + 'static,
  {
    Self::new(move || subscription.cancel())
  }

  pub fn cancel(&mut self) {
    if let Some(cancel) = self.cancel.take() {
      tracing::trace!(id = self.id, "cancellable cancelled");
      cancel();
    }
  }

  pub fn is_cancelled(&self) -> bool { self.cancel.is_none() }

  /// Moves the handle into `collection`, so its lifetime follows the
  /// collection's.
  pub fn store<C>(self, collection: &mut C)
  where
    C: Extend<AnyCancellable>,
  {
    collection.extend(std::iter::once(self));
  }
}

impl Drop for AnyCancellable {
  #[inline]
  fn drop(&mut self) { self.cancel() }
}

impl PartialEq for AnyCancellable {
  fn eq(&self, other: &Self) -> bool { self.id == other.id }
}

impl Eq for AnyCancellable {}

impl Hash for AnyCancellable {
  fn hash<H: Hasher>(&self, state: &mut H) { self.id.hash(state) }
}

impl Debug for AnyCancellable {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AnyCancellable")
      .field("id", &self.id)
      .field("is_cancelled", &self.is_cancelled())
      .finish()
  }
}
