//! Cold, demand-driven sources backed by an iterator.
//!
//! A [`Sequence`] pulls from its iterator only as far as the subscriber's
//! demand reaches and completes as soon as the iterator runs dry, without
//! waiting for further demand.

use std::{
  convert::Infallible,
  iter::Peekable,
  sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError},
};

use super::Publisher;
use crate::{
  subscriber::{Completion, Demand, Subscriber},
  subscription::Subscription,
};

/// Emits every item of `items`, then `completion`.
#[derive(Clone, Debug)]
pub struct Sequence<I, E> {
  pub(crate) items: I,
  pub(crate) completion: Completion<E>,
}

/// Emits `value` once, then finishes.
pub fn just<T>(value: T) -> Sequence<std::iter::Once<T>, Infallible> {
  Sequence { items: std::iter::once(value), completion: Completion::Finished }
}

/// Emits every item of `iter`, then finishes.
pub fn from_iter<I: IntoIterator>(iter: I) -> Sequence<I, Infallible> {
  Sequence { items: iter, completion: Completion::Finished }
}

/// Fails with `error` without emitting anything.
pub fn fail<T, E>(error: E) -> Sequence<std::iter::Empty<T>, E> {
  Sequence { items: std::iter::empty(), completion: Completion::Failure(error) }
}

/// Emits the value and finishes, or fails without a value.
pub fn from_result<T, E>(result: Result<T, E>) -> Sequence<Option<T>, E> {
  match result {
    Ok(value) => Sequence { items: Some(value), completion: Completion::Finished },
    Err(error) => Sequence { items: None, completion: Completion::Failure(error) },
  }
}

impl<I, E> Sequence<I, E> {
  /// Emits `items` and then completes with `completion`.
  pub fn new(items: I, completion: Completion<E>) -> Self { Sequence { items, completion } }
}

impl<I, E> Publisher for Sequence<I, E>
where
  I: IntoIterator,
  I::Item: Send + 'static,
  I::IntoIter: Send + 'static,
  E: Send + 'static,
{
  type Output = I::Item;
  type Failure = E;

  fn subscribe<S>(self, subscriber: S)
  where
    S: Subscriber<Self::Output, Self::Failure> + 'static,
  {
    let inner = Arc::new(Pump {
      state: Mutex::new(PumpState {
        items: Some(self.items.into_iter().peekable()),
        completion: Some(self.completion),
        demand: Demand::NONE,
        emitting: true,
        cancelled: false,
      }),
      downstream: Mutex::new(Some(subscriber)),
    });
    tracing::trace!("sequence subscribed");

    // Requests made while the subscription is being handed over only add
    // demand; emission starts once the handover returned.
    let subscription = Arc::new(SequenceSubscription(inner.clone()));
    if let Some(downstream) = lock(&inner.downstream).as_mut() {
      downstream.receive_subscription(subscription);
    }
    lock(&inner.state).emitting = false;
    inner.pump();
  }
}

struct PumpState<It: Iterator, E> {
  items: Option<Peekable<It>>,
  completion: Option<Completion<E>>,
  demand: Demand,
  emitting: bool,
  cancelled: bool,
}

struct Pump<It: Iterator, E, S> {
  state: Mutex<PumpState<It, E>>,
  downstream: Mutex<Option<S>>,
}

enum Step<T, E> {
  Value(T),
  Completion(Completion<E>),
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
  mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<It, E, S> Pump<It, E, S>
where
  It: Iterator,
  S: Subscriber<It::Item, E>,
{
  fn pump(&self) {
    {
      let mut state = lock(&self.state);
      if state.emitting || (state.completion.is_none() && !state.cancelled) {
        return;
      }
      state.emitting = true;
    }

    loop {
      let step = {
        let mut guard = lock(&self.state);
        let state = &mut *guard;
        if state.cancelled {
          state.emitting = false;
          drop(guard);
          let downstream = lock(&self.downstream).take();
          drop(downstream);
          return;
        }
        let exhausted = match state.items.as_mut() {
          Some(items) => items.peek().is_none(),
          None => true,
        };
        if exhausted {
          state.items = None;
          match state.completion.take() {
            Some(completion) => Step::Completion(completion),
            None => return,
          }
        } else if state.demand.take_one() {
          match state.items.as_mut().and_then(Iterator::next) {
            Some(value) => Step::Value(value),
            None => continue,
          }
        } else {
          state.emitting = false;
          return;
        }
      };

      match step {
        Step::Value(value) => {
          let more = match lock(&self.downstream).as_mut() {
            Some(downstream) => downstream.receive(value),
            None => Demand::NONE,
          };
          lock(&self.state).demand += more;
        }
        Step::Completion(completion) => {
          let downstream = lock(&self.downstream).take();
          if let Some(mut downstream) = downstream {
            tracing::trace!(finished = completion.is_finished(), "sequence completed");
            downstream.receive_completion(completion);
          }
          return;
        }
      }
    }
  }
}

struct SequenceSubscription<It: Iterator, E, S>(Arc<Pump<It, E, S>>);

impl<It, E, S> Subscription for SequenceSubscription<It, E, S>
where
  It: Iterator + Send,
  It::Item: Send,
  E: Send,
  S: Subscriber<It::Item, E>,
{
  fn request(&self, demand: Demand) {
    {
      let mut state = lock(&self.0.state);
      if state.cancelled {
        return;
      }
      state.demand += demand;
    }
    self.0.pump();
  }

  fn cancel(&self) {
    let items = {
      let mut state = lock(&self.0.state);
      if state.cancelled || state.completion.is_none() {
        return;
      }
      state.cancelled = true;
      state.completion = None;
      state.items.take()
    };
    drop(items);
    tracing::trace!("sequence cancelled");
    // A busy pump drops the subscriber itself once it sees the flag.
    let downstream = match self.0.downstream.try_lock() {
      Ok(mut guard) => guard.take(),
      Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner().take(),
      Err(TryLockError::WouldBlock) => None,
    };
    drop(downstream);
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
  };

  use crate::{prelude::*, subscriber::conduit::tests::Probe};

  #[rxcombine_macro::test]
  fn just_emits_once() {
    let probe = Probe::<i32, Infallible>::new(Demand::NONE);
    just(7).subscribe(probe.clone());
    probe.subscription.request(Demand::Unlimited);
    assert_eq!(*probe.values.lock().unwrap(), vec![7]);
    assert_eq!(*probe.completions.lock().unwrap(), vec![Completion::Finished]);
  }

  #[rxcombine_macro::test]
  fn honours_demand_and_completes_without_extra_demand() {
    let probe = Probe::<i32, Infallible>::new(Demand::NONE);
    from_iter(vec![1, 2, 3]).subscribe(probe.clone());
    assert!(probe.values.lock().unwrap().is_empty());

    probe.subscription.request(Demand::max(2));
    assert_eq!(*probe.values.lock().unwrap(), vec![1, 2]);
    assert!(probe.completions.lock().unwrap().is_empty());

    probe.subscription.request(Demand::max(1));
    assert_eq!(*probe.values.lock().unwrap(), vec![1, 2, 3]);
    assert_eq!(*probe.completions.lock().unwrap(), vec![Completion::Finished]);
  }

  #[rxcombine_macro::test]
  fn returned_demand_keeps_pulling() {
    let probe = Probe::<i32, Infallible>::new(Demand::max(1));
    from_iter(0..5).subscribe(probe.clone());
    probe.subscription.request(Demand::max(1));
    assert_eq!(*probe.values.lock().unwrap(), vec![0, 1, 2, 3, 4]);
  }

  #[rxcombine_macro::test]
  fn infinite_iterator_is_pulled_lazily() {
    let pulled = Arc::new(AtomicUsize::new(0));
    let c_pulled = pulled.clone();
    let probe = Probe::<usize, Infallible>::new(Demand::NONE);
    from_iter((0..).map(move |i| {
      c_pulled.fetch_add(1, Ordering::SeqCst);
      i
    }))
    .subscribe(probe.clone());
    probe.subscription.request(Demand::max(3));
    probe.subscription.cancel();
    assert_eq!(*probe.values.lock().unwrap(), vec![0, 1, 2]);
    // One item is peeked ahead to detect the end of the sequence.
    assert_eq!(pulled.load(Ordering::SeqCst), 4);
  }

  #[rxcombine_macro::test]
  fn fail_and_from_result() {
    let probe = Probe::<i32, &str>::new(Demand::NONE);
    fail::<i32, _>("nope").subscribe(probe.clone());
    assert!(probe.values.lock().unwrap().is_empty());
    assert_eq!(*probe.completions.lock().unwrap(), vec![Completion::Failure("nope")]);

    let values = Arc::new(Mutex::new(vec![]));
    let c_values = values.clone();
    let _c = from_result::<_, &str>(Ok(3)).sink_all(
      move |v| c_values.lock().unwrap().push(v),
      |c| assert!(c.is_finished()),
    );
    assert_eq!(*values.lock().unwrap(), vec![3]);
  }

  #[rxcombine_macro::test]
  fn cancel_from_inside_receive_stops_emission() {
    struct CancelAfterFirst {
      subscription: Option<AnySubscription>,
      got: Arc<Mutex<Vec<i32>>>,
    }
    impl Subscriber<i32, Infallible> for CancelAfterFirst {
      fn receive_subscription(&mut self, subscription: AnySubscription) {
        subscription.request(Demand::Unlimited);
        self.subscription = Some(subscription);
      }
      fn receive(&mut self, input: i32) -> Demand {
        self.got.lock().unwrap().push(input);
        if let Some(subscription) = &self.subscription {
          subscription.cancel();
        }
        Demand::NONE
      }
      fn receive_completion(&mut self, _: Completion<Infallible>) {
        panic!("cancelled subscriptions never complete");
      }
    }

    let got = Arc::new(Mutex::new(vec![]));
    from_iter(1..10).subscribe(CancelAfterFirst { subscription: None, got: got.clone() });
    assert_eq!(*got.lock().unwrap(), vec![1]);
  }

  #[rxcombine_macro::test]
  fn clones_run_independently() {
    let source = from_iter(vec!["a", "b"]);
    let first = Arc::new(Mutex::new(vec![]));
    let second = Arc::new(Mutex::new(vec![]));
    let c_first = first.clone();
    let c_second = second.clone();
    let _a = source.clone().sink(move |v| c_first.lock().unwrap().push(v));
    let _b = source.sink(move |v| c_second.lock().unwrap().push(v));
    assert_eq!(*first.lock().unwrap(), vec!["a", "b"]);
    assert_eq!(*second.lock().unwrap(), vec!["a", "b"]);
  }
}
