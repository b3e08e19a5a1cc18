//! Serialising delivery to one downstream subscriber.
//!
//! Every point where several producers may reach the same subscriber (a
//! subject's senders, both sides of `merge`, a `receive_on` hop) goes
//! through a [`Conduit`]. Producers only enqueue signals; whoever finds the
//! conduit idle becomes the single drainer and delivers queued signals one
//! by one, honouring the downstream's demand. Re-entrant calls made from
//! inside the downstream's callbacks therefore never recurse into it.
//!
//! No state lock is held while the downstream runs. The downstream itself
//! sits behind its own lock, held by the drainer for the duration of a
//! callback; `cancel` only ever `try_lock`s it, and the drainer drops the
//! subscriber when it notices the cancellation.

use std::{
  collections::VecDeque,
  sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError},
};

use super::{BoxedSubscriber, Completion, Demand, Subscriber};
use crate::{
  scheduler::Scheduler,
  subscription::{AnySubscription, Subscription},
};

enum Signal<I, E> {
  Subscription(AnySubscription),
  Value(I),
  Completion(Completion<E>),
}

struct State<I, E> {
  queue: VecDeque<Signal<I, E>>,
  draining: bool,
  demand: Demand,
  queued_values: usize,
  /// A completion has been queued; nothing else is accepted.
  terminated: bool,
  /// Cancelled, or the completion has been delivered.
  closed: bool,
  /// The subscription handed downstream. Demand returned from `receive`
  /// goes through it so it reaches the conduit's upstream as well.
  linked: Option<AnySubscription>,
}

struct Inner<I, E> {
  state: Mutex<State<I, E>>,
  downstream: Mutex<Option<BoxedSubscriber<I, E>>>,
  executor: Option<Arc<dyn Scheduler>>,
}

pub(crate) struct Conduit<I, E>(Arc<Inner<I, E>>);

impl<I, E> Clone for Conduit<I, E> {
  fn clone(&self) -> Self { Conduit(self.0.clone()) }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
  mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<I, E> Conduit<I, E>
where
  I: Send + 'static,
  E: Send + 'static,
{
  pub(crate) fn new(downstream: impl Subscriber<I, E> + 'static) -> Self {
    Self::build(Box::new(downstream), None)
  }

  /// Drains on `executor` instead of the producing thread. At most one drain
  /// task is scheduled at any time.
  pub(crate) fn with_executor(
    downstream: impl Subscriber<I, E> + 'static,
    executor: Arc<dyn Scheduler>,
  ) -> Self {
    Self::build(Box::new(downstream), Some(executor))
  }

  fn build(downstream: BoxedSubscriber<I, E>, executor: Option<Arc<dyn Scheduler>>) -> Self {
    Conduit(Arc::new(Inner {
      state: Mutex::new(State {
        queue: VecDeque::new(),
        draining: false,
        demand: Demand::NONE,
        queued_values: 0,
        terminated: false,
        closed: false,
        linked: None,
      }),
      downstream: Mutex::new(Some(downstream)),
      executor,
    }))
  }

  pub(crate) fn receive_subscription(&self, subscription: AnySubscription) {
    self.enqueue_subscription(subscription);
    self.drain();
  }

  /// Hands the subscription to the downstream on the calling thread, even
  /// when everything else drains on an executor. Signals produced while
  /// the downstream handles it are queued and drained afterwards.
  pub(crate) fn deliver_subscription(&self, subscription: AnySubscription) {
    {
      let mut state = lock(&self.0.state);
      if state.closed {
        drop(state);
        subscription.cancel();
        return;
      }
      if state.draining {
        state.queue.push_front(Signal::Subscription(subscription));
        return;
      }
      state.draining = true;
      state.linked = Some(subscription.clone());
    }
    if let Some(downstream) = lock(&self.0.downstream).as_mut() {
      downstream.receive_subscription(subscription);
    }
    let closed = {
      let mut state = lock(&self.0.state);
      state.draining = false;
      state.closed
    };
    if closed {
      let downstream = lock(&self.0.downstream).take();
      drop(downstream);
    } else {
      self.drain();
    }
  }

  pub(crate) fn enqueue_subscription(&self, subscription: AnySubscription) {
    let mut state = lock(&self.0.state);
    if !state.closed {
      state.queue.push_back(Signal::Subscription(subscription));
    }
  }

  /// Queues a value without draining. Returns `false` once the conduit is
  /// terminated or closed.
  pub(crate) fn enqueue(&self, value: I) -> bool {
    let mut state = lock(&self.0.state);
    if state.terminated || state.closed {
      return false;
    }
    state.queue.push_back(Signal::Value(value));
    state.queued_values += 1;
    true
  }

  /// Queues a value only if the downstream's outstanding demand covers it
  /// on top of what is already queued. Does not drain.
  pub(crate) fn enqueue_offer(&self, value: I) -> bool {
    let mut state = lock(&self.0.state);
    if state.terminated || state.closed || !state.demand.covers(state.queued_values) {
      return false;
    }
    state.queue.push_back(Signal::Value(value));
    state.queued_values += 1;
    true
  }

  pub(crate) fn push(&self, value: I) {
    if self.enqueue(value) {
      self.drain();
    }
  }

  /// Queues a completion without draining.
  ///
  /// `Finished` waits behind every queued value. A failure does not wait for
  /// demand: values the downstream has not asked for yet are abandoned.
  pub(crate) fn enqueue_completion(&self, completion: Completion<E>) -> bool {
    let mut state = lock(&self.0.state);
    if state.terminated || state.closed {
      return false;
    }
    state.terminated = true;
    if let Completion::Failure(_) = &completion {
      let keep = match state.demand {
        Demand::Unlimited => usize::MAX,
        Demand::Max(n) => n,
      };
      if state.queued_values > keep {
        let mut seen = 0;
        state.queue.retain(|signal| match signal {
          Signal::Value(_) => {
            seen += 1;
            seen <= keep
          }
          _ => true,
        });
        state.queued_values = keep;
      }
    }
    state.queue.push_back(Signal::Completion(completion));
    true
  }

  pub(crate) fn push_completion(&self, completion: Completion<E>) {
    if self.enqueue_completion(completion) {
      self.drain();
    }
  }

  pub(crate) fn request(&self, demand: Demand) {
    {
      let mut state = lock(&self.0.state);
      if state.closed {
        return;
      }
      state.demand += demand;
    }
    self.drain();
  }

  pub(crate) fn cancel(&self) {
    let linked = {
      let mut state = lock(&self.0.state);
      if state.closed {
        return;
      }
      state.closed = true;
      state.queue.clear();
      state.queued_values = 0;
      state.linked.take()
    };
    drop(linked);
    // The drainer drops the downstream itself if it is busy delivering.
    let downstream = match self.0.downstream.try_lock() {
      Ok(mut guard) => guard.take(),
      Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner().take(),
      Err(TryLockError::WouldBlock) => None,
    };
    drop(downstream);
  }

  pub(crate) fn is_closed(&self) -> bool { lock(&self.0.state).closed }

  pub(crate) fn ptr_eq(&self, other: &Self) -> bool { Arc::ptr_eq(&self.0, &other.0) }

  pub(crate) fn drain(&self) {
    {
      let mut state = lock(&self.0.state);
      if state.draining || state.closed || state.queue.is_empty() {
        return;
      }
      state.draining = true;
    }
    match &self.0.executor {
      Some(executor) => {
        let this = self.clone();
        executor.schedule(Box::new(move || this.drain_loop()));
      }
      None => self.drain_loop(),
    }
  }

  fn drain_loop(&self) {
    loop {
      let signal = {
        let mut guard = lock(&self.0.state);
        let state = &mut *guard;
        if state.closed {
          state.queue.clear();
          state.draining = false;
          let linked = state.linked.take();
          drop(guard);
          drop(linked);
          let downstream = lock(&self.0.downstream).take();
          drop(downstream);
          return;
        }
        let deliverable = match state.queue.front() {
          None => false,
          Some(Signal::Value(_)) => state.demand.take_one(),
          Some(_) => true,
        };
        if !deliverable {
          state.draining = false;
          return;
        }
        let signal = state.queue.pop_front();
        if let Some(Signal::Value(_)) = &signal {
          state.queued_values -= 1;
        }
        signal
      };

      match signal {
        Some(Signal::Subscription(subscription)) => {
          lock(&self.0.state).linked = Some(subscription.clone());
          if let Some(downstream) = lock(&self.0.downstream).as_mut() {
            downstream.receive_subscription(subscription);
          }
        }
        Some(Signal::Value(value)) => {
          let more = match lock(&self.0.downstream).as_mut() {
            Some(downstream) => downstream.receive(value),
            None => Demand::NONE,
          };
          if !more.is_none() {
            let linked = lock(&self.0.state).linked.clone();
            match linked {
              Some(subscription) => subscription.request(more),
              None => lock(&self.0.state).demand += more,
            }
          }
        }
        Some(Signal::Completion(completion)) => {
          let linked = {
            let mut state = lock(&self.0.state);
            state.closed = true;
            state.queue.clear();
            state.draining = false;
            state.linked.take()
          };
          drop(linked);
          let downstream = lock(&self.0.downstream).take();
          if let Some(mut downstream) = downstream {
            downstream.receive_completion(completion);
          }
          return;
        }
        None => {}
      }
    }
  }
}

impl<I, E> Subscription for Conduit<I, E>
where
  I: Send + 'static,
  E: Send + 'static,
{
  fn request(&self, demand: Demand) { Conduit::request(self, demand) }

  fn cancel(&self) { Conduit::cancel(self) }
}

/// The subscription a conduit hands its downstream: demand and cancel reach
/// both the conduit and whatever sits upstream of it.
///
/// It keeps the conduit alive so values still waiting for demand outlive
/// their producer. The resulting cycle is broken once the completion is
/// delivered or the subscription is cancelled.
pub(crate) struct ConduitSubscription<I, E, U> {
  conduit: Conduit<I, E>,
  upstream: U,
}

impl<I, E, U> ConduitSubscription<I, E, U> {
  pub(crate) fn new(conduit: Conduit<I, E>, upstream: U) -> Self {
    ConduitSubscription { conduit, upstream }
  }
}

impl<I, E, U> Subscription for ConduitSubscription<I, E, U>
where
  I: Send + 'static,
  E: Send + 'static,
  U: Subscription,
{
  fn request(&self, demand: Demand) {
    self.conduit.request(demand);
    self.upstream.request(demand);
  }

  fn cancel(&self) {
    self.conduit.cancel();
    self.upstream.cancel();
  }
}
