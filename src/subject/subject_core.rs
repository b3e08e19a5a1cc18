//! State shared by every handle of one subject.
//!
//! The registry, the cached value and the terminal state sit behind a single
//! lock. Sends queue into every subscriber's conduit while holding it and
//! drain after releasing it, so all subscribers observe one send order and a
//! subscriber attaching concurrently is never half-registered. No user code
//! runs under the lock.

use std::{mem, sync::Arc};

use super::subscribers::Subscribers;
use crate::{
  rc::{MutArc, WeakMutArc},
  subscriber::{conduit::Conduit, Completion, Demand, Subscriber},
  subscription::{AnySubscription, EmptySubscription, Subscription},
};

/// What a subject remembers for late subscribers.
pub(crate) trait Cache<T>: Send + 'static {
  fn store(&mut self, value: &T);

  fn replay(&self) -> Option<T>;
}

/// Remembers nothing.
impl<T> Cache<T> for () {
  #[inline]
  fn store(&mut self, _: &T) {}

  #[inline]
  fn replay(&self) -> Option<T> { None }
}

/// Remembers the most recent value.
pub(crate) struct Latest<T>(pub(crate) T);

impl<T: Clone + Send + 'static> Cache<T> for Latest<T> {
  fn store(&mut self, value: &T) { self.0 = value.clone(); }

  fn replay(&self) -> Option<T> { Some(self.0.clone()) }
}

pub(crate) struct SubjectState<T, E, C> {
  pub(crate) subscribers: Subscribers<T, E>,
  pub(crate) cache: C,
  completion: Option<Completion<E>>,
  /// Publishers this subject is subscribed to.
  upstreams: Vec<AnySubscription>,
}

pub(crate) struct SubjectCore<T, E, C>(MutArc<SubjectState<T, E, C>>);

impl<T, E, C> Clone for SubjectCore<T, E, C> {
  fn clone(&self) -> Self { SubjectCore(self.0.clone()) }
}

impl<T, E, C> SubjectCore<T, E, C>
where
  T: Clone + Send + 'static,
  E: Clone + Send + 'static,
  C: Cache<T>,
{
  pub(crate) fn new(cache: C) -> Self {
    SubjectCore(MutArc::own(SubjectState {
      subscribers: Subscribers::default(),
      cache,
      completion: None,
      upstreams: Vec::new(),
    }))
  }

  #[inline]
  pub(crate) fn state(&self) -> std::sync::MutexGuard<'_, SubjectState<T, E, C>> {
    self.0.rc_deref_mut()
  }

  pub(crate) fn subscribe(&self, subscriber: impl Subscriber<T, E> + 'static) {
    let conduit = Conduit::new(subscriber);
    {
      let mut state = self.0.rc_deref_mut();
      if let Some(completion) = &state.completion {
        conduit.enqueue_subscription(EmptySubscription::any());
        conduit.enqueue_completion(completion.clone());
      } else {
        let id = state.subscribers.add(conduit.clone());
        let subscription =
          SubjectSubscription { conduit: conduit.clone(), core: self.0.downgrade(), id };
        conduit.enqueue_subscription(Arc::new(subscription));
        // The cached value waits for the subscriber's first demand.
        if let Some(value) = state.cache.replay() {
          conduit.enqueue(value);
        }
      }
    }
    conduit.drain();
  }

  pub(crate) fn send(&self, value: T) {
    let pending = {
      let mut state = self.0.rc_deref_mut();
      if state.completion.is_some() {
        return;
      }
      state.cache.store(&value);
      state.subscribers.broadcast_value(value)
    };
    for conduit in pending {
      conduit.drain();
    }
  }

  pub(crate) fn send_completion(&self, completion: Completion<E>) {
    let (pending, upstreams) = {
      let mut state = self.0.rc_deref_mut();
      if state.completion.is_some() {
        return;
      }
      state.completion = Some(completion.clone());
      let upstreams = mem::take(&mut state.upstreams);
      (state.subscribers.broadcast_completion(completion), upstreams)
    };
    tracing::trace!(subscribers = pending.len(), "subject completed");
    for upstream in upstreams {
      upstream.cancel();
    }
    for conduit in pending {
      conduit.drain();
    }
  }

  /// Keeps an upstream the subject was subscribed to and asks it for
  /// everything it has.
  pub(crate) fn receive_subscription(&self, subscription: AnySubscription) {
    {
      let mut state = self.0.rc_deref_mut();
      if state.completion.is_none() {
        state.upstreams.push(subscription.clone());
        drop(state);
        subscription.request(Demand::Unlimited);
        return;
      }
    }
    subscription.cancel();
  }

  pub(crate) fn subscriber_count(&self) -> usize { self.0.rc_deref_mut().subscribers.len() }

  pub(crate) fn is_completed(&self) -> bool { self.0.rc_deref_mut().completion.is_some() }
}

/// A subscriber's handle on the subject. Cancelling detaches it from the
/// registry; demand goes to its conduit.
struct SubjectSubscription<T, E, C> {
  conduit: Conduit<T, E>,
  core: WeakMutArc<SubjectState<T, E, C>>,
  id: usize,
}

impl<T, E, C> Subscription for SubjectSubscription<T, E, C>
where
  T: Send + 'static,
  E: Send + 'static,
  C: Send + 'static,
{
  #[inline]
  fn request(&self, demand: Demand) { self.conduit.request(demand) }

  fn cancel(&self) {
    self.conduit.cancel();
    if let Some(core) = self.core.upgrade() {
      let removed = core.rc_deref_mut().subscribers.remove(self.id);
      drop(removed);
    }
  }
}
