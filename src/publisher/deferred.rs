use super::Publisher;
use crate::subscriber::Subscriber;

/// Builds a fresh publisher for every subscription.
#[derive(Clone)]
pub struct Deferred<F> {
  factory: F,
}

/// Postpones building the publisher until something subscribes.
pub fn deferred<P, F>(factory: F) -> Deferred<F>
where
  F: FnOnce() -> P,
  P: Publisher,
{
  Deferred { factory }
}

impl<P, F> Publisher for Deferred<F>
where
  F: FnOnce() -> P,
  P: Publisher,
{
  type Output = P::Output;
  type Failure = P::Failure;

  fn subscribe<S>(self, subscriber: S)
  where
    S: Subscriber<P::Output, P::Failure> + 'static,
  {
    (self.factory)().subscribe(subscriber)
  }
}
