//! Shared mutable state used by subscriptions, subjects and operators.
//!
//! Everything in this crate may be driven from several threads (a subject
//! sent to from one thread while a `receive_on` drain runs on a pool), so the
//! only wrapper is the `Arc<Mutex<_>>` flavour. A poisoned lock is recovered
//! with its inner value: a panicking user callback must not wedge every other
//! subscriber of the same stream.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError, Weak};

pub struct MutArc<T>(Arc<Mutex<T>>);

impl<T> MutArc<T> {
  pub fn own(t: T) -> Self { Self(Arc::new(Mutex::new(t))) }

  #[inline]
  pub fn rc_deref_mut(&self) -> MutexGuard<'_, T> {
    self.0.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Locks only if nobody else holds the lock, including the current thread
  /// further up the stack.
  #[inline]
  pub fn try_rc_deref_mut(&self) -> Option<MutexGuard<'_, T>> {
    match self.0.try_lock() {
      Ok(guard) => Some(guard),
      Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
      Err(TryLockError::WouldBlock) => None,
    }
  }

  pub fn downgrade(&self) -> WeakMutArc<T> { WeakMutArc(Arc::downgrade(&self.0)) }
}

impl<T> Clone for MutArc<T> {
  #[inline]
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T: Default> Default for MutArc<T> {
  fn default() -> Self { Self::own(T::default()) }
}

/// Non-owning handle to a [`MutArc`].
pub struct WeakMutArc<T>(Weak<Mutex<T>>);

impl<T> WeakMutArc<T> {
  pub fn upgrade(&self) -> Option<MutArc<T>> { self.0.upgrade().map(MutArc) }
}

impl<T> Clone for WeakMutArc<T> {
  fn clone(&self) -> Self { Self(self.0.clone()) }
}
