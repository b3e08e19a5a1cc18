use std::{
  fmt::{Debug, Formatter},
  sync::Arc,
};

use crate::subscriber::Demand;

mod cancellable;
mod proxy;

pub use cancellable::AnyCancellable;
pub use proxy::SubscriptionProxy;

/// The link between one publisher and one subscriber.
///
/// Demand is additive: every `request` adds to what is still outstanding.
/// `cancel` is idempotent and stops delivery as soon as it returns.
pub trait Subscription: Send + Sync {
  fn request(&self, demand: Demand);

  fn cancel(&self);
}

/// Type-erased subscription handed to subscribers.
pub type AnySubscription = Arc<dyn Subscription>;

impl Debug for dyn Subscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("dyn Subscription").finish_non_exhaustive()
  }
}

impl<T: Subscription + ?Sized> Subscription for Arc<T> {
  #[inline]
  fn request(&self, demand: Demand) { (**self).request(demand) }

  #[inline]
  fn cancel(&self) { (**self).cancel() }
}

/// A subscription with nothing behind it, handed out by sources that will
/// never deliver anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptySubscription;

impl Subscription for EmptySubscription {
  #[inline]
  fn request(&self, _: Demand) {}

  #[inline]
  fn cancel(&self) {}
}

impl EmptySubscription {
  pub fn any() -> AnySubscription { Arc::new(EmptySubscription) }
}
