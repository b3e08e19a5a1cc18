use std::sync::Arc;

use crate::{
  publisher::Publisher,
  scheduler::Scheduler,
  subscriber::{
    conduit::{Conduit, ConduitSubscription},
    Completion, Demand, Subscriber,
  },
  subscription::AnySubscription,
};

#[derive(Clone)]
pub struct ReceiveOn<S, SD> {
  pub(crate) source: S,
  pub(crate) scheduler: SD,
}

impl<S, SD> Publisher for ReceiveOn<S, SD>
where
  S: Publisher,
  SD: Scheduler,
{
  type Output = S::Output;
  type Failure = S::Failure;

  fn subscribe<O>(self, subscriber: O)
  where
    O: Subscriber<S::Output, S::Failure> + 'static,
  {
    let conduit = Conduit::with_executor(subscriber, Arc::new(self.scheduler));
    self.source.subscribe(ReceiveOnSubscriber { conduit })
  }
}

/// Hands values and the completion to a conduit draining on the scheduler,
/// so the downstream sees them one at a time and in upstream order. The
/// subscription itself is handed over straight away, so demand reaches the
/// upstream before the scheduler runs.
pub struct ReceiveOnSubscriber<Item, Err> {
  conduit: Conduit<Item, Err>,
}

impl<Item, Err> Subscriber<Item, Err> for ReceiveOnSubscriber<Item, Err>
where
  Item: Send + 'static,
  Err: Send + 'static,
{
  fn receive_subscription(&mut self, subscription: AnySubscription) {
    let subscription = ConduitSubscription::new(self.conduit.clone(), subscription);
    self.conduit.deliver_subscription(Arc::new(subscription));
  }

  fn receive(&mut self, input: Item) -> Demand {
    self.conduit.push(input);
    Demand::NONE
  }

  fn receive_completion(&mut self, completion: Completion<Err>) {
    self.conduit.push_completion(completion)
  }
}
