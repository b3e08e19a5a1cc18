use std::{mem, sync::Arc};

use super::Publisher;
use crate::{
  rc::{MutArc, WeakMutArc},
  subscriber::{conduit::Conduit, Completion, Demand, Subscriber},
  subscription::Subscription,
};

enum FutureState<T, E> {
  Pending(Vec<Conduit<T, E>>),
  Resolved(Result<T, E>),
}

/// A publisher producing a single result, eventually.
///
/// The producing closure runs once, when the future is created, and is
/// handed a [`Promise`] to fulfil whenever it is ready. Every subscriber,
/// before or after the promise is fulfilled, sees the same result.
pub struct Future<T, E> {
  state: MutArc<FutureState<T, E>>,
}

impl<T, E> Clone for Future<T, E> {
  fn clone(&self) -> Self { Future { state: self.state.clone() } }
}

/// The write side of a [`Future`]. Only the first result counts.
pub struct Promise<T, E> {
  state: MutArc<FutureState<T, E>>,
}

impl<T, E> Clone for Promise<T, E> {
  fn clone(&self) -> Self { Promise { state: self.state.clone() } }
}

/// Builds a [`Future`], running `attempt` immediately.
///
/// ```rust
/// use rxcombine::prelude::*;
///
/// let answer = future::<u32, String>(|promise| {
///   std::thread::spawn(move || promise.resolve(Ok(42)));
/// });
/// let (tx, rx) = std::sync::mpsc::channel();
/// let _c = answer.sink_all(move |v| tx.send(v).unwrap(), |_| {});
/// assert_eq!(rx.recv().unwrap(), 42);
/// ```
pub fn future<T, E>(attempt: impl FnOnce(Promise<T, E>)) -> Future<T, E> {
  let state = MutArc::own(FutureState::Pending(vec![]));
  attempt(Promise { state: state.clone() });
  Future { state }
}

fn deliver<T, E>(conduit: &Conduit<T, E>, result: Result<T, E>)
where
  T: Send + 'static,
  E: Send + 'static,
{
  match result {
    Ok(value) => {
      conduit.enqueue(value);
      conduit.enqueue_completion(Completion::Finished);
    }
    Err(err) => {
      conduit.enqueue_completion(Completion::Failure(err));
    }
  }
  conduit.drain();
}

impl<T, E> Promise<T, E>
where
  T: Clone + Send + 'static,
  E: Clone + Send + 'static,
{
  pub fn resolve(&self, result: Result<T, E>) {
    let mut state = self.state.rc_deref_mut();
    if let FutureState::Resolved(_) = &*state {
      tracing::trace!("promise already resolved, result ignored");
      return;
    }
    let waiters = match mem::replace(&mut *state, FutureState::Resolved(result.clone())) {
      FutureState::Pending(waiters) => waiters,
      FutureState::Resolved(_) => vec![],
    };
    drop(state);
    for conduit in waiters.into_iter().filter(|waiter| !waiter.is_closed()) {
      deliver(&conduit, result.clone());
    }
  }
}

impl<T, E> Publisher for Future<T, E>
where
  T: Clone + Send + 'static,
  E: Clone + Send + 'static,
{
  type Output = T;
  type Failure = E;

  fn subscribe<S>(self, subscriber: S)
  where
    S: Subscriber<T, E> + 'static,
  {
    let conduit = Conduit::new(subscriber);
    let subscription =
      FutureSubscription { conduit: conduit.clone(), state: self.state.downgrade() };
    conduit.enqueue_subscription(Arc::new(subscription));

    let mut state = self.state.rc_deref_mut();
    match &mut *state {
      FutureState::Pending(waiters) => {
        waiters.push(conduit.clone());
        drop(state);
        conduit.drain();
      }
      FutureState::Resolved(result) => {
        let result = result.clone();
        drop(state);
        deliver(&conduit, result);
      }
    }
  }
}

/// A waiter's subscription. Cancelling an unresolved future's subscription
/// also forgets the waiter.
struct FutureSubscription<T, E> {
  conduit: Conduit<T, E>,
  state: WeakMutArc<FutureState<T, E>>,
}

impl<T, E> Subscription for FutureSubscription<T, E>
where
  T: Send + 'static,
  E: Send + 'static,
{
  #[inline]
  fn request(&self, demand: Demand) { self.conduit.request(demand) }

  fn cancel(&self) {
    self.conduit.cancel();
    if let Some(state) = self.state.upgrade() {
      if let FutureState::Pending(waiters) = &mut *state.rc_deref_mut() {
        waiters.retain(|waiter| !waiter.ptr_eq(&self.conduit));
      }
    }
  }
}

#[cfg(test)]
impl<T, E> Future<T, E> {
  fn waiter_count(&self) -> usize {
    match &*self.state.rc_deref_mut() {
      FutureState::Pending(waiters) => waiters.len(),
      FutureState::Resolved(_) => 0,
    }
  }
}
