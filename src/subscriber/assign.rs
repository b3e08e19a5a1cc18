use std::sync::{Arc, Mutex, PoisonError};

use super::{Completion, Demand, Subscriber};
use crate::subscription::{AnyCancellable, AnySubscription, Subscription, SubscriptionProxy};

/// Writes every received value into a shared object through a setter.
pub struct Assign<O, F> {
  object: Arc<Mutex<O>>,
  setter: F,
  subscription: SubscriptionProxy,
}

impl<O, F> Assign<O, F> {
  pub fn new(object: Arc<Mutex<O>>, setter: F) -> Self {
    let subscription = SubscriptionProxy::new();
    subscription.request(Demand::Unlimited);
    Assign { object, setter, subscription }
  }

  pub fn cancellable(&self) -> AnyCancellable {
    AnyCancellable::from_subscription(self.subscription.clone())
  }
}

impl<T, E, O, F> Subscriber<T, E> for Assign<O, F>
where
  O: Send,
  F: FnMut(&mut O, T) + Send,
{
  fn receive_subscription(&mut self, subscription: AnySubscription) {
    self.subscription.attach(subscription);
  }

  fn receive(&mut self, input: T) -> Demand {
    if !self.subscription.is_closed() {
      let mut object = self.object.lock().unwrap_or_else(PoisonError::into_inner);
      (self.setter)(&mut object, input);
    }
    Demand::NONE
  }

  fn receive_completion(&mut self, _: Completion<E>) { self.subscription.release(); }
}
