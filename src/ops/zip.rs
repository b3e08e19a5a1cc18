//! Zip operator implementation
//!
//! Zip combines values from two publishers pairwise, emitting a tuple once
//! both sides have produced a value at the same index.

use std::collections::VecDeque;

use super::fan_in::FanIn;
use crate::{
  publisher::Publisher,
  rc::MutArc,
  subscriber::{Completion, Demand, Subscriber},
  subscription::{AnySubscription, SubscriptionProxy},
};

/// Zip operator
///
/// Buffers values from each side and emits `(a, b)` when both sides have a
/// value waiting. Finishes when either side finished with nothing left in its
/// buffer, since no more pairs can be formed.
#[derive(Clone)]
pub struct Zip<A, B> {
  pub(crate) source_a: A,
  pub(crate) source_b: B,
}

impl<A, B> Publisher for Zip<A, B>
where
  A: Publisher,
  B: Publisher<Failure = A::Failure>,
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
    let state = MutArc::own(ZipState::new());
    let shared = ZipShared { fan_in, state };
    self.source_a.subscribe(ZipASubscriber { shared: shared.clone(), id: a.0, proxy: a.1 });
    self.source_b.subscribe(ZipBSubscriber { shared, id: b.0, proxy: b.1 });
  }
}

// ==================== Shared State ====================

struct ZipState<ItemA, ItemB> {
  buffer_a: VecDeque<ItemA>,
  buffer_b: VecDeque<ItemB>,
  completed_a: bool,
  completed_b: bool,
}

impl<ItemA, ItemB> ZipState<ItemA, ItemB> {
  fn new() -> Self {
    Self {
      buffer_a: VecDeque::new(),
      buffer_b: VecDeque::new(),
      completed_a: false,
      completed_b: false,
    }
  }

  /// A finished side with an empty buffer can never form another pair.
  fn exhausted(&self) -> bool {
    (self.completed_a && self.buffer_a.is_empty()) || (self.completed_b && self.buffer_b.is_empty())
  }
}

struct ZipShared<ItemA, ItemB, Err> {
  fan_in: FanIn<(ItemA, ItemB), Err>,
  state: MutArc<ZipState<ItemA, ItemB>>,
}

impl<ItemA, ItemB, Err> Clone for ZipShared<ItemA, ItemB, Err> {
  fn clone(&self) -> Self { ZipShared { fan_in: self.fan_in.clone(), state: self.state.clone() } }
}

impl<ItemA, ItemB, Err> ZipShared<ItemA, ItemB, Err>
where
  ItemA: Send + 'static,
  ItemB: Send + 'static,
  Err: Send + 'static,
{
  fn update(&self, f: impl FnOnce(&mut ZipState<ItemA, ItemB>)) {
    let exhausted = {
      let mut state = self.state.rc_deref_mut();
      f(&mut *state);
      // Pairs are queued under the lock so they keep the order they were
      // formed in, whichever side formed them.
      while !state.buffer_a.is_empty() && !state.buffer_b.is_empty() {
        if let (Some(a), Some(b)) = (state.buffer_a.pop_front(), state.buffer_b.pop_front()) {
          self.fan_in.enqueue((a, b));
        }
      }
      state.exhausted()
    };
    if exhausted {
      self.fan_in.finish(Completion::Finished);
    } else {
      self.fan_in.drain();
    }
  }

  fn complete(
    &self,
    id: usize,
    completion: Completion<Err>,
    mark: impl FnOnce(&mut ZipState<ItemA, ItemB>),
  ) {
    self.fan_in.release(id);
    match completion {
      Completion::Finished => self.update(mark),
      failure => self.fan_in.finish(failure),
    }
  }
}

// ==================== Subscriber Structs ====================

/// Subscriber for source A
pub struct ZipASubscriber<ItemA, ItemB, Err> {
  shared: ZipShared<ItemA, ItemB, Err>,
  id: usize,
  proxy: SubscriptionProxy,
}

/// Subscriber for source B
pub struct ZipBSubscriber<ItemA, ItemB, Err> {
  shared: ZipShared<ItemA, ItemB, Err>,
  id: usize,
  proxy: SubscriptionProxy,
}

impl<ItemA, ItemB, Err> Subscriber<ItemA, Err> for ZipASubscriber<ItemA, ItemB, Err>
where
  ItemA: Send + 'static,
  ItemB: Send + 'static,
  Err: Send + 'static,
{
  fn receive_subscription(&mut self, subscription: AnySubscription) {
    self.proxy.attach(subscription);
  }

  fn receive(&mut self, input: ItemA) -> Demand {
    self.shared.update(|state| state.buffer_a.push_back(input));
    Demand::NONE
  }

  fn receive_completion(&mut self, completion: Completion<Err>) {
    self.shared.complete(self.id, completion, |state| state.completed_a = true);
  }
}

impl<ItemA, ItemB, Err> Subscriber<ItemB, Err> for ZipBSubscriber<ItemA, ItemB, Err>
where
  ItemA: Send + 'static,
  ItemB: Send + 'static,
  Err: Send + 'static,
{
  fn receive_subscription(&mut self, subscription: AnySubscription) {
    self.proxy.attach(subscription);
  }

  fn receive(&mut self, input: ItemB) -> Demand {
    self.shared.update(|state| state.buffer_b.push_back(input));
    Demand::NONE
  }

  fn receive_completion(&mut self, completion: Completion<Err>) {
    self.shared.complete(self.id, completion, |state| state.completed_b = true);
  }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
  use std::sync::{Arc, Mutex};

  use crate::{prelude::*, subscriber::conduit::tests::Probe};

  #[rxcombine_macro::test]
  fn test_zip_basic() {
    let result = Arc::new(Mutex::new(Vec::new()));
    let result_clone = result.clone();

    let _c = from_iter([1, 2, 3])
      .zip(from_iter([4, 5, 6]))
      .sink(move |v| result_clone.lock().unwrap().push(v));

    assert_eq!(*result.lock().unwrap(), vec![(1, 4), (2, 5), (3, 6)]);
  }

  #[rxcombine_macro::test]
  fn test_zip_different_lengths() {
    let result = Arc::new(Mutex::new(Vec::new()));
    let completed = Arc::new(Mutex::new(false));
    let result_clone = result.clone();
    let completed_clone = completed.clone();

    let _c = from_iter([1, 2, 3, 4, 5]).zip(from_iter([10, 20, 30])).sink_all(
      move |v| result_clone.lock().unwrap().push(v),
      move |_| *completed_clone.lock().unwrap() = true,
    );

    assert_eq!(*result.lock().unwrap(), vec![(1, 10), (2, 20), (3, 30)]);
    assert!(*completed.lock().unwrap());
  }

  #[rxcombine_macro::test]
  fn test_zip_pairs_by_index_across_interleaving() {
    let names = PassthroughSubject::<&'static str, Infallible>::new();
    let ages = PassthroughSubject::<u32, Infallible>::new();
    let result = Arc::new(Mutex::new(Vec::new()));
    let result_clone = result.clone();
    let _c = names
      .clone()
      .zip(ages.clone())
      .sink(move |v| result_clone.lock().unwrap().push(v));

    names.send("Kim");
    names.send("Jim");
    ages.send(22);
    ages.send(29);
    assert_eq!(*result.lock().unwrap(), vec![("Kim", 22), ("Jim", 29)]);
  }

  #[rxcombine_macro::test]
  fn test_zip_completes_when_one_side_runs_dry() {
    let a = PassthroughSubject::<i32, ()>::new();
    let b = PassthroughSubject::<i32, ()>::new();
    let probe = Probe::new(Demand::Unlimited);
    a.clone().zip(b.clone()).subscribe(probe.clone());
    probe.subscription.request(Demand::max(1));

    a.send(1);
    a.send(2);
    a.send_completion(Completion::Finished);
    b.send(10);
    assert!(probe.completions.lock().unwrap().is_empty());
    b.send(20);
    assert_eq!(*probe.values.lock().unwrap(), vec![(1, 10), (2, 20)]);
    assert_eq!(*probe.completions.lock().unwrap(), vec![Completion::Finished]);
    assert_eq!(b.subscriber_count(), 0);
  }

  #[rxcombine_macro::test]
  fn test_zip_error_propagation() {
    let a = PassthroughSubject::<i32, &'static str>::new();
    let b = PassthroughSubject::<i32, &'static str>::new();
    let probe = Probe::new(Demand::Unlimited);
    a.clone().zip(b.clone()).subscribe(probe.clone());
    probe.subscription.request(Demand::max(1));

    a.send(1);
    b.send_completion(Completion::Failure("error"));
    a.send(2);
    assert!(probe.values.lock().unwrap().is_empty());
    assert_eq!(*probe.completions.lock().unwrap(), vec![Completion::Failure("error")]);
    assert_eq!(a.subscriber_count(), 0);
  }

  #[rxcombine_macro::test]
  fn test_zip_respects_downstream_demand() {
    let probe = Probe::<(i32, char), Infallible>::new(Demand::NONE);
    from_iter(0..3).zip(from_iter(['a', 'b', 'c'])).subscribe(probe.clone());
    probe.subscription.request(Demand::max(2));
    assert_eq!(*probe.values.lock().unwrap(), vec![(0, 'a'), (1, 'b')]);
    assert!(probe.completions.lock().unwrap().is_empty());
    probe.subscription.request(Demand::max(1));
    assert_eq!(probe.values.lock().unwrap().len(), 3);
    assert_eq!(*probe.completions.lock().unwrap(), vec![Completion::Finished]);
  }
}
