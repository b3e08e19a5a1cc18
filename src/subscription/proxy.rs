use std::mem;

use super::{AnySubscription, Subscription};
use crate::{rc::MutArc, subscriber::Demand};

enum ProxyState {
  /// No subscription yet, demand requested so far.
  Pending(Demand),
  Active(AnySubscription),
  Closed,
}

/// A one-shot slot for a subscription that may not have arrived yet.
///
/// Demand requested before the subscription arrives is accumulated and
/// forwarded on [`attach`](SubscriptionProxy::attach); a cancel before that
/// point cancels the subscription as soon as it shows up.
#[derive(Clone)]
pub struct SubscriptionProxy(MutArc<ProxyState>);

impl Default for SubscriptionProxy {
  fn default() -> Self { Self(MutArc::own(ProxyState::Pending(Demand::NONE))) }
}

impl SubscriptionProxy {
  pub fn new() -> Self { Self::default() }

  pub fn attach(&self, subscription: AnySubscription) {
    let mut state = self.0.rc_deref_mut();
    let previous = mem::replace(&mut *state, ProxyState::Active(subscription.clone()));
    match previous {
      ProxyState::Pending(demand) => {
        drop(state);
        if !demand.is_none() {
          subscription.request(demand);
        }
      }
      ProxyState::Active(existing) => {
        *state = ProxyState::Active(existing);
        drop(state);
        tracing::warn!("subscription received twice, cancelling the second");
        subscription.cancel();
      }
      ProxyState::Closed => {
        *state = ProxyState::Closed;
        drop(state);
        subscription.cancel();
      }
    }
  }

  /// Closes the slot without cancelling, once a terminal event arrived.
  pub fn release(&self) { *self.0.rc_deref_mut() = ProxyState::Closed; }

  pub fn is_closed(&self) -> bool {
    matches!(*self.0.rc_deref_mut(), ProxyState::Closed)
  }
}

impl Subscription for SubscriptionProxy {
  fn request(&self, demand: Demand) {
    let active = match &mut *self.0.rc_deref_mut() {
      ProxyState::Pending(pending) => {
        *pending += demand;
        None
      }
      ProxyState::Active(subscription) => Some(subscription.clone()),
      ProxyState::Closed => None,
    };
    if let Some(subscription) = active {
      subscription.request(demand);
    }
  }

  fn cancel(&self) {
    let previous = mem::replace(&mut *self.0.rc_deref_mut(), ProxyState::Closed);
    if let ProxyState::Active(subscription) = previous {
      subscription.cancel();
    }
  }
}
