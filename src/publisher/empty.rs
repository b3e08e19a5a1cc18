use std::{convert::Infallible, marker::PhantomData};

use super::Publisher;
use crate::{
  subscriber::{Completion, Subscriber},
  subscription::EmptySubscription,
};

/// Emits nothing. Finishes right away unless built with
/// `complete_immediately` off, in which case it never terminates.
pub struct Empty<T, E = Infallible> {
  complete_immediately: bool,
  _marker: PhantomData<fn() -> (T, E)>,
}

impl<T, E> Empty<T, E> {
  pub fn new(complete_immediately: bool) -> Self {
    Empty { complete_immediately, _marker: PhantomData }
  }
}

impl<T, E> Clone for Empty<T, E> {
  fn clone(&self) -> Self { Empty::new(self.complete_immediately) }
}

/// Finishes without emitting anything.
pub fn empty<T>() -> Empty<T> { Empty::new(true) }

/// Never emits and never terminates.
pub fn never<T>() -> Empty<T> { Empty::new(false) }

impl<T, E> Publisher for Empty<T, E>
where
  T: Send + 'static,
  E: Send + 'static,
{
  type Output = T;
  type Failure = E;

  fn subscribe<S>(self, mut subscriber: S)
  where
    S: Subscriber<T, E> + 'static,
  {
    subscriber.receive_subscription(EmptySubscription::any());
    if self.complete_immediately {
      subscriber.receive_completion(Completion::Finished);
    }
  }
}
