//! The delivery point shared by operators with more than one upstream.
//!
//! A [`FanIn`] owns the conduit feeding the downstream and the proxies of
//! every live upstream. Upstreams request unlimited demand; the conduit
//! buffers for whatever the downstream asked for. The first terminal event
//! handed to [`FanIn::finish`] cancels every upstream still running.

use std::{mem, sync::Arc};

use smallvec::SmallVec;

use crate::{
  rc::MutArc,
  subscriber::{conduit::Conduit, Completion, Demand, Subscriber},
  subscription::{AnySubscription, Subscription, SubscriptionProxy},
};

struct Upstreams {
  live: SmallVec<[(usize, SubscriptionProxy); 2]>,
  next_id: usize,
  closed: bool,
}

pub(crate) struct FanIn<I, E> {
  conduit: Conduit<I, E>,
  upstreams: MutArc<Upstreams>,
}

impl<I, E> Clone for FanIn<I, E> {
  fn clone(&self) -> Self {
    FanIn { conduit: self.conduit.clone(), upstreams: self.upstreams.clone() }
  }
}

impl<I, E> FanIn<I, E>
where
  I: Send + 'static,
  E: Send + 'static,
{
  /// Hands the downstream its subscription straight away.
  pub(crate) fn new(downstream: impl Subscriber<I, E> + 'static) -> Self {
    let fan_in = FanIn {
      conduit: Conduit::new(downstream),
      upstreams: MutArc::own(Upstreams { live: SmallVec::new(), next_id: 0, closed: false }),
    };
    fan_in.conduit.receive_subscription(Arc::new(fan_in.clone()));
    fan_in
  }

  /// Registers one more upstream. `None` once the fan-in has terminated or
  /// been cancelled, in which case nothing should be subscribed.
  pub(crate) fn add_upstream(&self) -> Option<(usize, SubscriptionProxy)> {
    let mut upstreams = self.upstreams.rc_deref_mut();
    if upstreams.closed {
      return None;
    }
    let id = upstreams.next_id;
    upstreams.next_id += 1;
    let proxy = SubscriptionProxy::new();
    proxy.request(Demand::Unlimited);
    upstreams.live.push((id, proxy.clone()));
    Some((id, proxy))
  }

  /// Forgets a finished upstream. Returns `true` if it was the last one and
  /// the fan-in is still open.
  pub(crate) fn release(&self, id: usize) -> bool {
    let released = {
      let mut upstreams = self.upstreams.rc_deref_mut();
      let pos = upstreams.live.iter().position(|(i, _)| *i == id);
      let released = pos.map(|pos| upstreams.live.remove(pos).1);
      if upstreams.closed {
        return false;
      }
      (released, upstreams.live.is_empty())
    };
    let (proxy, last) = released;
    if let Some(proxy) = proxy {
      proxy.release();
    }
    last
  }

  /// Finish once every upstream finished, fail on the first failure.
  pub(crate) fn complete_upstream(&self, id: usize, completion: Completion<E>) {
    let last = self.release(id);
    match completion {
      Completion::Finished if last => self.finish(Completion::Finished),
      Completion::Finished => {}
      failure => self.finish(failure),
    }
  }

  pub(crate) fn push(&self, value: I) { self.conduit.push(value) }

  /// Queues without delivering, for callers holding their own state lock.
  pub(crate) fn enqueue(&self, value: I) -> bool { self.conduit.enqueue(value) }

  pub(crate) fn drain(&self) { self.conduit.drain() }

  /// Cancels the remaining upstreams and terminates the downstream.
  pub(crate) fn finish(&self, completion: Completion<E>) {
    if self.close_upstreams() {
      self.conduit.push_completion(completion);
    }
  }

  fn close_upstreams(&self) -> bool {
    let live = {
      let mut upstreams = self.upstreams.rc_deref_mut();
      if upstreams.closed {
        return false;
      }
      upstreams.closed = true;
      mem::take(&mut upstreams.live)
    };
    for (_, proxy) in live {
      proxy.cancel();
    }
    true
  }
}

impl<I, E> Subscription for FanIn<I, E>
where
  I: Send + 'static,
  E: Send + 'static,
{
  fn request(&self, demand: Demand) { self.conduit.request(demand) }

  fn cancel(&self) {
    self.conduit.cancel();
    self.close_upstreams();
  }
}

/// An upstream whose values go to the fan-in unchanged.
pub(crate) struct Branch<I, E> {
  fan_in: FanIn<I, E>,
  id: usize,
  proxy: SubscriptionProxy,
}

impl<I, E> Branch<I, E> {
  pub(crate) fn new(fan_in: FanIn<I, E>, (id, proxy): (usize, SubscriptionProxy)) -> Self {
    Branch { fan_in, id, proxy }
  }
}

impl<I, E> Subscriber<I, E> for Branch<I, E>
where
  I: Send + 'static,
  E: Send + 'static,
{
  fn receive_subscription(&mut self, subscription: AnySubscription) {
    self.proxy.attach(subscription);
  }

  fn receive(&mut self, input: I) -> Demand {
    self.fan_in.push(input);
    Demand::NONE
  }

  fn receive_completion(&mut self, completion: Completion<E>) {
    self.fan_in.complete_upstream(self.id, completion);
  }
}
