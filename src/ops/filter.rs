use crate::{
  publisher::Publisher,
  subscriber::{Completion, Demand, Subscriber},
  subscription::AnySubscription,
};

#[derive(Clone)]
pub struct Filter<S, F> {
  pub(crate) source: S,
  pub(crate) predicate: F,
}

impl<S, F> Publisher for Filter<S, F>
where
  S: Publisher,
  F: FnMut(&S::Output) -> bool + Send + 'static,
{
  type Output = S::Output;
  type Failure = S::Failure;

  fn subscribe<O>(self, subscriber: O)
  where
    O: Subscriber<S::Output, S::Failure> + 'static,
  {
    self
      .source
      .subscribe(FilterSubscriber { downstream: subscriber, predicate: self.predicate })
  }
}

pub struct FilterSubscriber<O, F> {
  downstream: O,
  predicate: F,
}

impl<Item, Err, O, F> Subscriber<Item, Err> for FilterSubscriber<O, F>
where
  O: Subscriber<Item, Err>,
  F: FnMut(&Item) -> bool + Send,
{
  #[inline]
  fn receive_subscription(&mut self, subscription: AnySubscription) {
    self.downstream.receive_subscription(subscription)
  }

  fn receive(&mut self, input: Item) -> Demand {
    if (self.predicate)(&input) {
      self.downstream.receive(input)
    } else {
      // The dropped value used up one unit of the downstream's demand.
      Demand::max(1)
    }
  }

  #[inline]
  fn receive_completion(&mut self, completion: Completion<Err>) {
    self.downstream.receive_completion(completion)
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{Arc, Mutex};

  use crate::{prelude::*, subscriber::conduit::tests::Probe};

  #[rxcombine_macro::test]
  fn keeps_matching_values_in_order() {
    let got = Arc::new(Mutex::new(vec![]));
    let c_got = got.clone();
    let _c = from_iter(0..10)
      .filter(|v| v % 3 == 0)
      .sink(move |v| c_got.lock().unwrap().push(v));
    assert_eq!(*got.lock().unwrap(), vec![0, 3, 6, 9]);
  }

  #[rxcombine_macro::test]
  fn filtered_values_do_not_consume_demand() {
    let probe = Probe::<i32, Infallible>::new(Demand::NONE);
    from_iter(1..=10).filter(|v| v % 2 == 0).subscribe(probe.clone());
    probe.subscription.request(Demand::max(3));
    assert_eq!(*probe.values.lock().unwrap(), vec![2, 4, 6]);
  }

  #[rxcombine_macro::test]
  fn failure_passes_through() {
    let completion = Arc::new(Mutex::new(None));
    let c_completion = completion.clone();
    let _c = fail::<i32, _>(5u8)
      .filter(|_| true)
      .sink_all(|_| {}, move |c| *c_completion.lock().unwrap() = Some(c));
    assert_eq!(*completion.lock().unwrap(), Some(Completion::Failure(5)));
  }
}
