use std::sync::Arc;

use crate::{
  publisher::Publisher,
  scheduler::Scheduler,
  subscriber::{Completion, Demand, Subscriber},
  subscription::{AnySubscription, Subscription},
};

#[derive(Clone)]
pub struct SubscribeOn<S, SD> {
  pub(crate) source: S,
  pub(crate) scheduler: SD,
}

impl<S, SD> Publisher for SubscribeOn<S, SD>
where
  S: Publisher + Send + 'static,
  SD: Scheduler + Clone,
{
  type Output = S::Output;
  type Failure = S::Failure;

  fn subscribe<O>(self, subscriber: O)
  where
    O: Subscriber<S::Output, S::Failure> + 'static,
  {
    let source = self.source;
    let scheduler = self.scheduler.clone();
    self.scheduler.schedule(Box::new(move || {
      source.subscribe(SubscribeOnSubscriber { downstream: subscriber, scheduler })
    }));
  }
}

pub struct SubscribeOnSubscriber<O, SD> {
  downstream: O,
  scheduler: SD,
}

impl<Item, Err, O, SD> Subscriber<Item, Err> for SubscribeOnSubscriber<O, SD>
where
  O: Subscriber<Item, Err>,
  SD: Scheduler + Clone,
{
  fn receive_subscription(&mut self, subscription: AnySubscription) {
    let scheduler = self.scheduler.clone();
    let subscription = Arc::new(SubscribeOnSubscription { upstream: subscription, scheduler });
    self.downstream.receive_subscription(subscription)
  }

  #[inline]
  fn receive(&mut self, input: Item) -> Demand { self.downstream.receive(input) }

  #[inline]
  fn receive_completion(&mut self, completion: Completion<Err>) {
    self.downstream.receive_completion(completion)
  }
}

/// Requests go through the scheduler; cancel takes effect immediately.
struct SubscribeOnSubscription<SD> {
  upstream: AnySubscription,
  scheduler: SD,
}

impl<SD: Scheduler> Subscription for SubscribeOnSubscription<SD> {
  fn request(&self, demand: Demand) {
    let upstream = self.upstream.clone();
    self.scheduler.schedule(Box::new(move || upstream.request(demand)));
  }

  fn cancel(&self) { self.upstream.cancel() }
}
