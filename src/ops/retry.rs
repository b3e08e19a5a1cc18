//! Resubscribing to a failed publisher.
//!
//! The downstream keeps one subscription across attempts. Demand it
//! requested and has not yet received is carried over to every new attempt.

use std::sync::Arc;

use crate::{
  publisher::Publisher,
  rc::MutArc,
  subscriber::{Completion, Demand, Subscriber},
  subscription::{AnySubscription, Subscription, SubscriptionProxy},
};

#[derive(Clone)]
pub struct Retry<S> {
  pub(crate) source: S,
  pub(crate) attempts: usize,
}

impl<S> Publisher for Retry<S>
where
  S: Publisher + Clone + Send + 'static,
{
  type Output = S::Output;
  type Failure = S::Failure;

  fn subscribe<O>(self, subscriber: O)
  where
    O: Subscriber<S::Output, S::Failure> + 'static,
  {
    let shared = MutArc::own(RetryState {
      current: SubscriptionProxy::new(),
      outstanding: Demand::NONE,
      cancelled: false,
    });
    let mut downstream = subscriber;
    downstream.receive_subscription(Arc::new(RetrySubscription { shared: shared.clone() }));
    let current = shared.rc_deref_mut().current.clone();
    self.source.clone().subscribe(RetrySubscriber {
      source: self.source,
      remaining: self.attempts,
      downstream: Some(downstream),
      current,
      shared,
    });
  }
}

struct RetryState {
  current: SubscriptionProxy,
  /// Requested by the downstream and not yet delivered.
  outstanding: Demand,
  cancelled: bool,
}

struct RetrySubscription {
  shared: MutArc<RetryState>,
}

impl Subscription for RetrySubscription {
  fn request(&self, demand: Demand) {
    let current = {
      let mut state = self.shared.rc_deref_mut();
      if state.cancelled {
        return;
      }
      state.outstanding += demand;
      state.current.clone()
    };
    current.request(demand);
  }

  fn cancel(&self) {
    let current = {
      let mut state = self.shared.rc_deref_mut();
      state.cancelled = true;
      state.current.clone()
    };
    current.cancel();
  }
}

pub struct RetrySubscriber<S, O> {
  source: S,
  remaining: usize,
  downstream: Option<O>,
  current: SubscriptionProxy,
  shared: MutArc<RetryState>,
}

impl<S, O> Subscriber<S::Output, S::Failure> for RetrySubscriber<S, O>
where
  S: Publisher + Clone + Send + 'static,
  O: Subscriber<S::Output, S::Failure> + 'static,
{
  fn receive_subscription(&mut self, subscription: AnySubscription) {
    self.current.attach(subscription);
  }

  fn receive(&mut self, input: S::Output) -> Demand {
    let Some(downstream) = self.downstream.as_mut() else {
      return Demand::NONE;
    };
    let _ = self.shared.rc_deref_mut().outstanding.take_one();
    let more = downstream.receive(input);
    self.shared.rc_deref_mut().outstanding += more;
    more
  }

  fn receive_completion(&mut self, completion: Completion<S::Failure>) {
    let Some(mut downstream) = self.downstream.take() else {
      return;
    };
    self.current.release();
    if let Completion::Failure(_) = &completion {
      if self.remaining > 0 {
        let next = {
          let mut state = self.shared.rc_deref_mut();
          if state.cancelled {
            None
          } else {
            let proxy = SubscriptionProxy::new();
            proxy.request(state.outstanding);
            state.current = proxy.clone();
            Some(proxy)
          }
        };
        if let Some(current) = next {
          tracing::trace!(remaining = self.remaining - 1, "retrying after failure");
          self.source.clone().subscribe(RetrySubscriber {
            source: self.source.clone(),
            remaining: self.remaining - 1,
            downstream: Some(downstream),
            current,
            shared: self.shared.clone(),
          });
        }
        return;
      }
    }
    downstream.receive_completion(completion);
  }
}
