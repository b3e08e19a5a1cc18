use std::marker::PhantomData;

use crate::{
  publisher::Publisher,
  subscriber::{Completion, Demand, Subscriber},
  subscription::AnySubscription,
};

pub struct TryMap<S, F, E> {
  source: S,
  func: F,
  _failure: PhantomData<fn() -> E>,
}

impl<S, F, E> TryMap<S, F, E> {
  pub(crate) fn new(source: S, func: F) -> Self {
    TryMap { source, func, _failure: PhantomData }
  }
}

impl<S: Clone, F: Clone, E> Clone for TryMap<S, F, E> {
  fn clone(&self) -> Self { TryMap::new(self.source.clone(), self.func.clone()) }
}

impl<B, S, F, E> Publisher for TryMap<S, F, E>
where
  S: Publisher,
  S::Failure: Into<E>,
  F: FnMut(S::Output) -> Result<B, E> + Send + 'static,
  B: Send + 'static,
  E: Send + 'static,
{
  type Output = B;
  type Failure = E;

  fn subscribe<O>(self, subscriber: O)
  where
    O: Subscriber<B, E> + 'static,
  {
    self.source.subscribe(TryMapSubscriber::new(subscriber, self.func))
  }
}

/// Applies a fallible transform; the first error cancels upstream and
/// becomes the downstream's failure.
pub struct TryMapSubscriber<O, F> {
  downstream: O,
  func: F,
  upstream: Option<AnySubscription>,
  failed: bool,
}

impl<O, F> TryMapSubscriber<O, F> {
  pub(crate) fn new(downstream: O, func: F) -> Self {
    TryMapSubscriber { downstream, func, upstream: None, failed: false }
  }
}

impl<Item, B, Err, E, O, F> Subscriber<Item, Err> for TryMapSubscriber<O, F>
where
  O: Subscriber<B, E>,
  F: FnMut(Item) -> Result<B, E> + Send,
  Err: Into<E>,
{
  fn receive_subscription(&mut self, subscription: AnySubscription) {
    self.upstream = Some(subscription.clone());
    self.downstream.receive_subscription(subscription)
  }

  fn receive(&mut self, input: Item) -> Demand {
    if self.failed {
      return Demand::NONE;
    }
    match (self.func)(input) {
      Ok(value) => self.downstream.receive(value),
      Err(err) => {
        self.failed = true;
        if let Some(upstream) = self.upstream.take() {
          upstream.cancel();
        }
        self.downstream.receive_completion(Completion::Failure(err));
        Demand::NONE
      }
    }
  }

  fn receive_completion(&mut self, completion: Completion<Err>) {
    if !self.failed {
      self.upstream = None;
      self.downstream.receive_completion(completion.map_failure(Into::into))
    }
  }
}
