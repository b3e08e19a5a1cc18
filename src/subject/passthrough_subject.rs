use super::{impl_subject, subject_core::SubjectCore};

/// A subject without memory: subscribers only see values sent after they
/// attached, and only as far as their demand reaches.
///
/// ```rust
/// use rxcombine::prelude::*;
/// use std::sync::{Arc, Mutex};
///
/// let subject = PassthroughSubject::<&str, Infallible>::new();
/// subject.send("lost");
///
/// let seen = Arc::new(Mutex::new(vec![]));
/// let c_seen = seen.clone();
/// let _c = subject.clone().sink(move |v| c_seen.lock().unwrap().push(v));
/// subject.send("kept");
/// assert_eq!(*seen.lock().unwrap(), vec!["kept"]);
/// ```
pub struct PassthroughSubject<T, E> {
  core: SubjectCore<T, E, ()>,
}

impl<T, E> Clone for PassthroughSubject<T, E> {
  fn clone(&self) -> Self { PassthroughSubject { core: self.core.clone() } }
}

impl<T, E> Default for PassthroughSubject<T, E>
where
  T: Clone + Send + 'static,
  E: Clone + Send + 'static,
{
  fn default() -> Self { PassthroughSubject { core: SubjectCore::new(()) } }
}

impl<T, E> PassthroughSubject<T, E>
where
  T: Clone + Send + 'static,
  E: Clone + Send + 'static,
{
  pub fn new() -> Self { Self::default() }
}

impl_subject!(PassthroughSubject);

#[cfg(test)]
mod test {
  use std::sync::{Arc, Mutex};

  use crate::{prelude::*, subscriber::conduit::tests::Probe};

  #[rxcombine_macro::test]
  fn base_data_flow() {
    let i = Arc::new(Mutex::new(0));
    let c_i = i.clone();
    let broadcast = PassthroughSubject::<i32, ()>::new();
    let _c = broadcast
      .clone()
      .sink_all(move |v| *c_i.lock().unwrap() = v * 2, |_| {});
    broadcast.send(1);
    assert_eq!(*i.lock().unwrap(), 2);
  }

  #[rxcombine_macro::test]
  fn sends_before_subscribing_are_lost() {
    let subject = PassthroughSubject::<&'static str, Infallible>::new();
    subject.send("before");
    let probe = Probe::new(Demand::NONE);
    subject.clone().subscribe(probe.clone());
    probe.subscription.request(Demand::Unlimited);
    subject.send("after");
    assert_eq!(*probe.values.lock().unwrap(), vec!["after"]);
  }

  #[rxcombine_macro::test]
  fn sends_beyond_demand_are_dropped() {
    let subject = PassthroughSubject::<i32, Infallible>::new();
    let probe = Probe::new(Demand::NONE);
    subject.clone().subscribe(probe.clone());
    probe.subscription.request(Demand::max(2));
    (1..=4).for_each(|v| subject.send(v));
    probe.subscription.request(Demand::max(1));
    subject.send(5);
    assert_eq!(*probe.values.lock().unwrap(), vec![1, 2, 5]);
  }

  #[rxcombine_macro::test]
  fn unsubscribe() {
    let i = Arc::new(Mutex::new(0));
    let c_i = i.clone();
    let subject = PassthroughSubject::<i32, ()>::new();
    subject
      .clone()
      .sink_all(move |v| *c_i.lock().unwrap() = v, |_| {})
      .cancel();
    subject.send(100);
    assert_eq!(*i.lock().unwrap(), 0);
    assert_eq!(subject.subscriber_count(), 0);
  }

  #[rxcombine_macro::test]
  fn completion_reaches_late_subscribers() {
    let subject = PassthroughSubject::<i32, &'static str>::new();
    subject.send_completion(Completion::Failure("closed"));
    subject.send_completion(Completion::Finished);
    subject.send(1);

    let probe = Probe::new(Demand::NONE);
    subject.clone().subscribe(probe.clone());
    assert!(probe.values.lock().unwrap().is_empty());
    assert_eq!(*probe.completions.lock().unwrap(), vec![Completion::Failure("closed")]);
    assert!(subject.is_completed());
  }

  #[rxcombine_macro::test]
  fn subject_subscribes_to_a_publisher() {
    let subject = PassthroughSubject::<i32, Infallible>::new();
    let probe = Probe::new(Demand::Unlimited);
    subject.clone().subscribe(probe.clone());
    probe.subscription.request(Demand::max(1));

    from_iter(1..=3).subscribe(subject.clone());
    assert_eq!(*probe.values.lock().unwrap(), vec![1, 2, 3]);
    assert_eq!(*probe.completions.lock().unwrap(), vec![Completion::Finished]);

    // Inert after the upstream completed.
    subject.send(4);
    assert_eq!(probe.values.lock().unwrap().len(), 3);
  }

  #[rxcombine_macro::test]
  fn subject_subscribe_subject() {
    let upstream = PassthroughSubject::<i32, ()>::new();
    let downstream = PassthroughSubject::<i32, ()>::new();
    let got = Arc::new(Mutex::new(vec![]));
    let c_got = got.clone();
    let _c = downstream
      .clone()
      .sink_all(move |v| c_got.lock().unwrap().push(v), |_| {});
    upstream.clone().subscribe(downstream.clone());

    upstream.send(1);
    upstream.send(2);
    upstream.send_completion(Completion::Failure(()));
    assert_eq!(*got.lock().unwrap(), vec![1, 2]);
    assert!(downstream.is_completed());
  }

  #[rxcombine_macro::test]
  fn concurrent_sends_reach_every_subscriber_in_one_order() {
    let subject = PassthroughSubject::<usize, Infallible>::new();
    let first = Arc::new(Mutex::new(vec![]));
    let second = Arc::new(Mutex::new(vec![]));
    let (c_first, c_second) = (first.clone(), second.clone());
    let _a = subject.clone().sink(move |v| c_first.lock().unwrap().push(v));
    let _b = subject.clone().sink(move |v| c_second.lock().unwrap().push(v));

    let handles: Vec<_> = (0..4)
      .map(|t| {
        let subject = subject.clone();
        std::thread::spawn(move || (0..100).for_each(|i| subject.send(t * 100 + i)))
      })
      .collect();
    handles.into_iter().for_each(|h| h.join().unwrap());

    let first = first.lock().unwrap();
    assert_eq!(first.len(), 400);
    assert_eq!(*first, *second.lock().unwrap());
  }
}
