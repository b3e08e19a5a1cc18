use super::{Completion, Demand, Subscriber};
use crate::subscription::{AnyCancellable, AnySubscription, Subscription, SubscriptionProxy};

/// Closure based subscriber requesting unlimited demand as soon as it is
/// subscribed.
///
/// Usually created through `sink`/`sink_all`, which also hand back the
/// [`AnyCancellable`] controlling it.
pub struct Sink<N, C> {
  on_value: N,
  on_completion: Option<C>,
  subscription: SubscriptionProxy,
}

impl<N, C> Sink<N, C> {
  pub fn new(on_value: N, on_completion: C) -> Self {
    let subscription = SubscriptionProxy::new();
    subscription.request(Demand::Unlimited);
    Sink { on_value, on_completion: Some(on_completion), subscription }
  }

  /// A handle cancelling this sink's subscription, whenever it arrives.
  pub fn cancellable(&self) -> AnyCancellable {
    AnyCancellable::from_subscription(self.subscription.clone())
  }
}

impl<T, E, N, C> Subscriber<T, E> for Sink<N, C>
where
  N: FnMut(T) + Send,
  C: FnOnce(Completion<E>) + Send,
{
  fn receive_subscription(&mut self, subscription: AnySubscription) {
    self.subscription.attach(subscription);
  }

  fn receive(&mut self, input: T) -> Demand {
    if !self.subscription.is_closed() {
      (self.on_value)(input);
    }
    Demand::NONE
  }

  fn receive_completion(&mut self, completion: Completion<E>) {
    self.subscription.release();
    if let Some(on_completion) = self.on_completion.take() {
      tracing::trace!("sink completed");
      on_completion(completion);
    }
  }
}

#[cfg(test)]
mod tests {
  use std::{
    convert::Infallible,
    sync::{Arc, Mutex},
  };

  use crate::prelude::*;

  #[rxcombine_macro::test]
  fn sink_receives_everything() {
    let values = Arc::new(Mutex::new(vec![]));
    let c_values = values.clone();
    let _c = from_iter(1..=3).sink(move |v| c_values.lock().unwrap().push(v));
    assert_eq!(*values.lock().unwrap(), vec![1, 2, 3]);
  }

  #[rxcombine_macro::test]
  fn sink_all_sees_failure() {
    let completion = Arc::new(Mutex::new(None));
    let c_completion = completion.clone();
    let _c = fail::<i32, _>("boom").sink_all(
      |_| unreachable!(),
      move |c| *c_completion.lock().unwrap() = Some(c),
    );
    assert_eq!(*completion.lock().unwrap(), Some(Completion::Failure("boom")));
  }

  #[rxcombine_macro::test]
  fn cancelled_sink_stops_receiving() {
    let subject = PassthroughSubject::<i32, Infallible>::new();
    let values = Arc::new(Mutex::new(vec![]));
    let c_values = values.clone();
    let mut cancellable = subject.clone().sink(move |v| c_values.lock().unwrap().push(v));
    subject.send(1);
    cancellable.cancel();
    subject.send(2);
    assert_eq!(*values.lock().unwrap(), vec![1]);
  }
}
