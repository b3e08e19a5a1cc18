use super::fan_in::FanIn;
use crate::{
  publisher::Publisher,
  rc::MutArc,
  subscriber::{Completion, Demand, Subscriber},
  subscription::{AnySubscription, SubscriptionProxy},
};

#[derive(Clone)]
pub struct CombineLatest<A, B> {
  pub(crate) source_a: A,
  pub(crate) source_b: B,
}

impl<A, B> Publisher for CombineLatest<A, B>
where
  A: Publisher,
  B: Publisher<Failure = A::Failure>,
  A::Output: Clone,
  B::Output: Clone,
{
  type Output = (A::Output, B::Output);
  type Failure = A::Failure;

  fn subscribe<O>(self, subscriber: O)
  where
    O: Subscriber<(A::Output, B::Output), A::Failure> + 'static,
  {
    let fan_in = FanIn::new(subscriber);
    let (Some(a), Some(b)) = (fan_in.add_upstream(), fan_in.add_upstream()) else {
      return;
    };
    let combine = CombineLatestSubscriber { fan_in, latest: MutArc::own((None, None)) };
    self.source_a.subscribe(ASubscriber { combine: combine.clone(), id: a.0, proxy: a.1 });
    self.source_b.subscribe(BSubscriber { combine, id: b.0, proxy: b.1 });
  }
}

enum CombineItem<A, B> {
  ItemA(A),
  ItemB(B),
}

struct CombineLatestSubscriber<A, B, Err> {
  fan_in: FanIn<(A, B), Err>,
  latest: MutArc<(Option<A>, Option<B>)>,
}

impl<A, B, Err> Clone for CombineLatestSubscriber<A, B, Err> {
  fn clone(&self) -> Self {
    CombineLatestSubscriber { fan_in: self.fan_in.clone(), latest: self.latest.clone() }
  }
}

impl<A, B, Err> CombineLatestSubscriber<A, B, Err>
where
  A: Clone + Send + 'static,
  B: Clone + Send + 'static,
  Err: Send + 'static,
{
  fn next(&self, value: CombineItem<A, B>) {
    {
      let mut latest = self.latest.rc_deref_mut();
      match value {
        CombineItem::ItemA(v) => latest.0 = Some(v),
        CombineItem::ItemB(v) => latest.1 = Some(v),
      }
      if let (Some(a), Some(b)) = &*latest {
        self.fan_in.enqueue((a.clone(), b.clone()));
      }
    }
    self.fan_in.drain();
  }

  #[inline]
  fn complete(&self, id: usize, completion: Completion<Err>) {
    self.fan_in.complete_upstream(id, completion)
  }
}

pub struct ASubscriber<A, B, Err> {
  combine: CombineLatestSubscriber<A, B, Err>,
  id: usize,
  proxy: SubscriptionProxy,
}

impl<A, B, Err> Subscriber<A, Err> for ASubscriber<A, B, Err>
where
  A: Clone + Send + 'static,
  B: Clone + Send + 'static,
  Err: Send + 'static,
{
  #[inline]
  fn receive_subscription(&mut self, subscription: AnySubscription) {
    self.proxy.attach(subscription)
  }

  fn receive(&mut self, input: A) -> Demand {
    self.combine.next(CombineItem::ItemA(input));
    Demand::NONE
  }

  #[inline]
  fn receive_completion(&mut self, completion: Completion<Err>) {
    self.combine.complete(self.id, completion)
  }
}

pub struct BSubscriber<A, B, Err> {
  combine: CombineLatestSubscriber<A, B, Err>,
  id: usize,
  proxy: SubscriptionProxy,
}

impl<A, B, Err> Subscriber<B, Err> for BSubscriber<A, B, Err>
where
  A: Clone + Send + 'static,
  B: Clone + Send + 'static,
  Err: Send + 'static,
{
  #[inline]
  fn receive_subscription(&mut self, subscription: AnySubscription) {
    self.proxy.attach(subscription)
  }

  fn receive(&mut self, input: B) -> Demand {
    self.combine.next(CombineItem::ItemB(input));
    Demand::NONE
  }

  #[inline]
  fn receive_completion(&mut self, completion: Completion<Err>) {
    self.combine.complete(self.id, completion)
  }
}
