use crate::{
  publisher::Publisher,
  subscriber::{Completion, Demand, Subscriber},
  subscription::AnySubscription,
};

#[derive(Clone)]
pub struct Map<S, F> {
  pub(crate) source: S,
  pub(crate) func: F,
}

impl<B, S, F> Publisher for Map<S, F>
where
  S: Publisher,
  F: FnMut(S::Output) -> B + Send + 'static,
  B: Send + 'static,
{
  type Output = B;
  type Failure = S::Failure;

  fn subscribe<O>(self, subscriber: O)
  where
    O: Subscriber<B, S::Failure> + 'static,
  {
    self.source.subscribe(MapSubscriber { downstream: subscriber, func: self.func })
  }
}

pub struct MapSubscriber<O, F> {
  downstream: O,
  func: F,
}

impl<Item, B, Err, O, F> Subscriber<Item, Err> for MapSubscriber<O, F>
where
  O: Subscriber<B, Err>,
  F: FnMut(Item) -> B + Send,
{
  #[inline]
  fn receive_subscription(&mut self, subscription: AnySubscription) {
    self.downstream.receive_subscription(subscription)
  }

  #[inline]
  fn receive(&mut self, input: Item) -> Demand { self.downstream.receive((self.func)(input)) }

  #[inline]
  fn receive_completion(&mut self, completion: Completion<Err>) {
    self.downstream.receive_completion(completion)
  }
}
