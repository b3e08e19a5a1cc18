//! Publishers fed by hand.
//!
//! A subject is a hot publisher: subscribers see what is sent after they
//! attach. It is also a [`Subscriber`](crate::subscriber::Subscriber), so it
//! can be subscribed to another publisher and re-emit what that produces.

use crate::{publisher::Publisher, subscriber::Completion};

mod current_value_subject;
mod passthrough_subject;
mod subject_core;
mod subscribers;

pub use current_value_subject::CurrentValueSubject;
pub use passthrough_subject::PassthroughSubject;

pub trait Subject: Publisher + Clone + Send + Sync {
  /// Delivers `value` to every subscriber with outstanding demand. Ignored
  /// once the subject completed.
  fn send(&self, value: Self::Output);

  /// Terminates every current and future subscription. Only the first
  /// completion counts.
  fn send_completion(&self, completion: Completion<Self::Failure>);

  #[inline]
  fn finish(&self) { self.send_completion(Completion::Finished) }
}

/// Implements `Publisher`, `Subscriber` and `Subject` for a wrapper around
/// a `SubjectCore` stored in its `core` field.
macro_rules! impl_subject {
  ($name:ident) => {
    impl<T, E> $crate::publisher::Publisher for $name<T, E>
    where
      T: Clone + Send + 'static,
      E: Clone + Send + 'static,
    {
      type Output = T;
      type Failure = E;

      fn subscribe<O>(self, subscriber: O)
      where
        O: $crate::subscriber::Subscriber<T, E> + 'static,
      {
        self.core.subscribe(subscriber)
      }
    }

    impl<T, E> $crate::subscriber::Subscriber<T, E> for $name<T, E>
    where
      T: Clone + Send + 'static,
      E: Clone + Send + 'static,
    {
      fn receive_subscription(&mut self, subscription: $crate::subscription::AnySubscription) {
        self.core.receive_subscription(subscription)
      }

      fn receive(&mut self, input: T) -> $crate::subscriber::Demand {
        self.core.send(input);
        $crate::subscriber::Demand::NONE
      }

      fn receive_completion(&mut self, completion: $crate::subscriber::Completion<E>) {
        self.core.send_completion(completion)
      }
    }

    impl<T, E> $crate::subject::Subject for $name<T, E>
    where
      T: Clone + Send + 'static,
      E: Clone + Send + 'static,
    {
      #[inline]
      fn send(&self, value: T) { self.core.send(value) }

      #[inline]
      fn send_completion(&self, completion: $crate::subscriber::Completion<E>) {
        self.core.send_completion(completion)
      }
    }

    impl<T, E> $name<T, E>
    where
      T: Clone + Send + 'static,
      E: Clone + Send + 'static,
    {
      /// Number of subscribers currently attached.
      pub fn subscriber_count(&self) -> usize { self.core.subscriber_count() }

      pub fn is_completed(&self) -> bool { self.core.is_completed() }
    }
  };
}

pub(crate) use impl_subject;
