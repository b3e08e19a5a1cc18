use super::fan_in::{Branch, FanIn};
use crate::{
  publisher::Publisher,
  subscriber::{Completion, Demand, Subscriber},
  subscription::{AnySubscription, SubscriptionProxy},
};

/// Maps each value to a publisher and merges the values of all of them, in
/// order of arrival.
///
/// Finishes once the source and every inner publisher finished. The first
/// failure, from the source or any inner publisher, fails the output and
/// cancels everything else.
#[derive(Clone)]
pub struct FlatMap<S, F> {
  pub(crate) source: S,
  pub(crate) func: F,
}

impl<S, F, Q> Publisher for FlatMap<S, F>
where
  S: Publisher,
  F: FnMut(S::Output) -> Q + Send + 'static,
  Q: Publisher<Failure = S::Failure>,
{
  type Output = Q::Output;
  type Failure = S::Failure;

  fn subscribe<O>(self, subscriber: O)
  where
    O: Subscriber<Q::Output, S::Failure> + 'static,
  {
    let fan_in = FanIn::new(subscriber);
    let Some((id, proxy)) = fan_in.add_upstream() else {
      return;
    };
    self.source.subscribe(FlatMapSubscriber { fan_in, id, proxy, func: self.func })
  }
}

pub struct FlatMapSubscriber<I, E, F> {
  fan_in: FanIn<I, E>,
  id: usize,
  proxy: SubscriptionProxy,
  func: F,
}

impl<Item, I, E, F, Q> Subscriber<Item, E> for FlatMapSubscriber<I, E, F>
where
  F: FnMut(Item) -> Q + Send,
  Q: Publisher<Output = I, Failure = E>,
  I: Send + 'static,
  E: Send + 'static,
{
  fn receive_subscription(&mut self, subscription: AnySubscription) {
    self.proxy.attach(subscription);
  }

  fn receive(&mut self, input: Item) -> Demand {
    let inner = (self.func)(input);
    // Registered before subscribing so the source finishing meanwhile
    // still waits for it.
    if let Some(upstream) = self.fan_in.add_upstream() {
      inner.subscribe(Branch::new(self.fan_in.clone(), upstream));
    }
    Demand::NONE
  }

  fn receive_completion(&mut self, completion: Completion<E>) {
    self.fan_in.complete_upstream(self.id, completion);
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{Arc, Mutex};

  use crate::{prelude::*, subscriber::conduit::tests::Probe};

  #[rxcombine_macro::test]
  fn flattens_inner_sequences() {
    let got = Arc::new(Mutex::new(vec![]));
    let c_got = got.clone();
    let _c = from_iter(1..=3usize)
      .flat_map(|n| from_iter(std::iter::repeat(n).take(n)))
      .sink(move |v| c_got.lock().unwrap().push(v));
    assert_eq!(*got.lock().unwrap(), vec![1, 2, 2, 3, 3, 3]);
  }

  #[rxcombine_macro::test]
  fn waits_for_live_inners() {
    let source = PassthroughSubject::<&'static str, ()>::new();
    let inners: Vec<PassthroughSubject<String, ()>> =
      (0..2).map(|_| PassthroughSubject::new()).collect();
    let c_inners = inners.clone();
    let probe = Probe::new(Demand::Unlimited);
    source
      .clone()
      .flat_map(move |key| {
        let idx = if key == "a" { 0 } else { 1 };
        c_inners[idx].clone().map(move |v| format!("{key}{v}"))
      })
      .subscribe(probe.clone());
    probe.subscription.request(Demand::max(1));

    source.send("a");
    source.send("b");
    inners[1].send("1".into());
    inners[0].send("2".into());
    source.send_completion(Completion::Finished);
    inners[0].send_completion(Completion::Finished);
    assert!(probe.completions.lock().unwrap().is_empty());
    inners[1].send("3".into());
    inners[1].send_completion(Completion::Finished);

    assert_eq!(*probe.values.lock().unwrap(), vec!["b1", "a2", "b3"]);
    assert_eq!(*probe.completions.lock().unwrap(), vec![Completion::Finished]);
  }

  #[rxcombine_macro::test]
  fn inner_failure_fails_the_output() {
    let source = PassthroughSubject::<i32, &'static str>::new();
    let completion = Arc::new(Mutex::new(None));
    let c_completion = completion.clone();
    let _c = source
      .clone()
      .flat_map(|v| {
        if v < 0 {
          fail("negative").box_it()
        } else {
          from_result(Ok(v)).box_it()
        }
      })
      .sink_all(|_| {}, move |c| *c_completion.lock().unwrap() = Some(c));
    source.send(1);
    source.send(-1);
    assert_eq!(*completion.lock().unwrap(), Some(Completion::Failure("negative")));
    assert_eq!(source.subscriber_count(), 0);
  }
}
