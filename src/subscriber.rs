//! The consuming side of a stream.
//!
//! A [`Subscriber`] first receives the subscription that links it to its
//! publisher, then zero or more values, then at most one [`Completion`].
//! Every value handed over answers with the additional [`Demand`] the
//! subscriber is willing to take.

use std::ops::{Add, AddAssign};

use crate::subscription::AnySubscription;

pub(crate) mod conduit;
mod assign;
mod sink;

pub use assign::Assign;
pub use sink::Sink;

// ============================================================================
// Demand
// ============================================================================

/// How many more values a subscriber is ready to receive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Demand {
  Unlimited,
  Max(usize),
}

impl Demand {
  /// No further values.
  pub const NONE: Demand = Demand::Max(0);

  #[inline]
  pub fn max(n: usize) -> Self { Demand::Max(n) }

  #[inline]
  pub fn unlimited() -> Self { Demand::Unlimited }

  #[inline]
  pub fn is_none(&self) -> bool { *self == Demand::NONE }

  #[inline]
  pub fn is_unlimited(&self) -> bool { *self == Demand::Unlimited }

  /// Consumes one unit of demand. Returns `false` if none was left.
  pub(crate) fn take_one(&mut self) -> bool {
    match self {
      Demand::Unlimited => true,
      Demand::Max(0) => false,
      Demand::Max(n) => {
        *n -= 1;
        true
      }
    }
  }

  /// Whether `queued` already accepted values still leave room for one more.
  pub(crate) fn covers(&self, queued: usize) -> bool {
    match self {
      Demand::Unlimited => true,
      Demand::Max(n) => *n > queued,
    }
  }
}

impl Default for Demand {
  fn default() -> Self { Demand::NONE }
}

impl Add for Demand {
  type Output = Demand;

  fn add(self, rhs: Demand) -> Demand {
    match (self, rhs) {
      (Demand::Max(a), Demand::Max(b)) => Demand::Max(a.saturating_add(b)),
      _ => Demand::Unlimited,
    }
  }
}

impl AddAssign for Demand {
  fn add_assign(&mut self, rhs: Demand) { *self = *self + rhs; }
}

// ============================================================================
// Completion
// ============================================================================

/// Terminal event of a stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Completion<E> {
  Finished,
  Failure(E),
}

impl<E> Completion<E> {
  pub fn is_finished(&self) -> bool { matches!(self, Completion::Finished) }

  pub fn failure(&self) -> Option<&E> {
    match self {
      Completion::Finished => None,
      Completion::Failure(err) => Some(err),
    }
  }

  pub fn map_failure<F>(self, f: impl FnOnce(E) -> F) -> Completion<F> {
    match self {
      Completion::Finished => Completion::Finished,
      Completion::Failure(err) => Completion::Failure(f(err)),
    }
  }
}

impl<E> From<Result<(), E>> for Completion<E> {
  fn from(result: Result<(), E>) -> Self {
    match result {
      Ok(()) => Completion::Finished,
      Err(err) => Completion::Failure(err),
    }
  }
}

// ============================================================================
// Subscriber
// ============================================================================

/// Sink of a publisher's values and of its terminal event.
///
/// Implementations are driven strictly sequentially for a given
/// subscription: the next call never starts before the previous one
/// returned.
pub trait Subscriber<Input, Failure>: Send {
  /// Called once, before anything else. Demand is signalled through the
  /// subscription; nothing is delivered until some is requested.
  fn receive_subscription(&mut self, subscription: AnySubscription);

  /// Receives one value and returns the demand to add on top of what was
  /// already requested.
  fn receive(&mut self, input: Input) -> Demand;

  /// Receives the terminal event. No other call follows.
  fn receive_completion(&mut self, completion: Completion<Failure>);
}

/// Type-erased subscriber.
pub type BoxedSubscriber<Input, Failure> = Box<dyn Subscriber<Input, Failure>>;

impl<Input, Failure, S> Subscriber<Input, Failure> for Box<S>
where
  S: Subscriber<Input, Failure> + ?Sized,
{
  #[inline]
  fn receive_subscription(&mut self, subscription: AnySubscription) {
    (**self).receive_subscription(subscription)
  }

  #[inline]
  fn receive(&mut self, input: Input) -> Demand { (**self).receive(input) }

  #[inline]
  fn receive_completion(&mut self, completion: Completion<Failure>) {
    (**self).receive_completion(completion)
  }
}
