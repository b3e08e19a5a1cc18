use std::{convert::Infallible, marker::PhantomData};

use crate::{
  publisher::Publisher,
  subscriber::{Completion, Demand, Subscriber},
  subscription::AnySubscription,
};

#[derive(Clone)]
pub struct MapErr<S, F> {
  pub(crate) source: S,
  pub(crate) func: F,
}

impl<E, S, F> Publisher for MapErr<S, F>
where
  S: Publisher,
  F: FnMut(S::Failure) -> E + Send + 'static,
  E: Send + 'static,
{
  type Output = S::Output;
  type Failure = E;

  fn subscribe<O>(self, subscriber: O)
  where
    O: Subscriber<S::Output, E> + 'static,
  {
    self.source.subscribe(MapErrSubscriber { downstream: subscriber, func: self.func })
  }
}

pub struct MapErrSubscriber<O, F> {
  downstream: O,
  func: F,
}

impl<Item, Err, E, O, F> Subscriber<Item, Err> for MapErrSubscriber<O, F>
where
  O: Subscriber<Item, E>,
  F: FnMut(Err) -> E + Send,
{
  #[inline]
  fn receive_subscription(&mut self, subscription: AnySubscription) {
    self.downstream.receive_subscription(subscription)
  }

  #[inline]
  fn receive(&mut self, input: Item) -> Demand { self.downstream.receive(input) }

  fn receive_completion(&mut self, completion: Completion<Err>) {
    let completion = completion.map_failure(&mut self.func);
    self.downstream.receive_completion(completion)
  }
}

/// Re-types a stream that never fails.
pub struct SetFailureType<S, E> {
  source: S,
  _failure: PhantomData<fn() -> E>,
}

impl<S, E> SetFailureType<S, E> {
  pub(crate) fn new(source: S) -> Self { SetFailureType { source, _failure: PhantomData } }
}

impl<S: Clone, E> Clone for SetFailureType<S, E> {
  fn clone(&self) -> Self { SetFailureType::new(self.source.clone()) }
}

impl<S, E> Publisher for SetFailureType<S, E>
where
  S: Publisher<Failure = Infallible>,
  E: Send + 'static,
{
  type Output = S::Output;
  type Failure = E;

  fn subscribe<O>(self, subscriber: O)
  where
    O: Subscriber<S::Output, E> + 'static,
  {
    self.source.subscribe(MapErrSubscriber { downstream: subscriber, func: absurd::<E> })
  }
}

fn absurd<E>(never: Infallible) -> E { match never {} }
