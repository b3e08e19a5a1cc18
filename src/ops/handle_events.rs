//! Side-effect hooks on a stream's lifecycle.

use std::{fmt::Debug, sync::Arc};

use crate::{
  publisher::Publisher,
  subscriber::{Completion, Demand, Subscriber},
  subscription::{AnySubscription, Subscription},
};

type Hook = Arc<dyn Fn() + Send + Sync>;
type OutputHook<T> = Arc<dyn Fn(&T) + Send + Sync>;
type CompletionHook<E> = Arc<dyn Fn(&Completion<E>) + Send + Sync>;
type RequestHook = Arc<dyn Fn(Demand) + Send + Sync>;

/// Hooks run by `handle_events`, built up one at a time.
///
/// ```rust
/// use rxcombine::prelude::*;
/// use std::sync::{atomic::{AtomicUsize, Ordering}, Arc};
///
/// let seen = Arc::new(AtomicUsize::new(0));
/// let c_seen = seen.clone();
/// let _c = from_iter(0..3)
///   .handle_events(Events::new().on_output(move |_| {
///     c_seen.fetch_add(1, Ordering::SeqCst);
///   }))
///   .sink(|_| {});
/// assert_eq!(seen.load(Ordering::SeqCst), 3);
/// ```
pub struct Events<T, E> {
  on_subscription: Option<Hook>,
  on_output: Option<OutputHook<T>>,
  on_completion: Option<CompletionHook<E>>,
  on_cancel: Option<Hook>,
  on_request: Option<RequestHook>,
}

impl<T, E> Default for Events<T, E> {
  fn default() -> Self {
    Events {
      on_subscription: None,
      on_output: None,
      on_completion: None,
      on_cancel: None,
      on_request: None,
    }
  }
}

impl<T, E> Clone for Events<T, E> {
  fn clone(&self) -> Self {
    Events {
      on_subscription: self.on_subscription.clone(),
      on_output: self.on_output.clone(),
      on_completion: self.on_completion.clone(),
      on_cancel: self.on_cancel.clone(),
      on_request: self.on_request.clone(),
    }
  }
}

impl<T, E> Events<T, E> {
  pub fn new() -> Self { Self::default() }

  pub fn on_subscription(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
    self.on_subscription = Some(Arc::new(hook));
    self
  }

  pub fn on_output(mut self, hook: impl Fn(&T) + Send + Sync + 'static) -> Self {
    self.on_output = Some(Arc::new(hook));
    self
  }

  pub fn on_completion(mut self, hook: impl Fn(&Completion<E>) + Send + Sync + 'static) -> Self {
    self.on_completion = Some(Arc::new(hook));
    self
  }

  pub fn on_cancel(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
    self.on_cancel = Some(Arc::new(hook));
    self
  }

  pub fn on_request(mut self, hook: impl Fn(Demand) + Send + Sync + 'static) -> Self {
    self.on_request = Some(Arc::new(hook));
    self
  }
}

impl<T: Debug, E: Debug> Events<T, E> {
  /// Hooks logging every event at debug level under `prefix`.
  pub(crate) fn logging(prefix: String) -> Self {
    let prefix: Arc<str> = prefix.into();
    let p1 = prefix.clone();
    let p2 = prefix.clone();
    let p3 = prefix.clone();
    let p4 = prefix.clone();
    Events::new()
      .on_subscription(move || tracing::debug!("{p1}: receive subscription"))
      .on_output(move |v| tracing::debug!("{p2}: receive value: ({v:?})"))
      .on_completion(move |c| match c {
        Completion::Finished => tracing::debug!("{p3}: receive finished"),
        Completion::Failure(err) => tracing::debug!("{p3}: receive error: ({err:?})"),
      })
      .on_cancel(move || tracing::debug!("{p4}: receive cancel"))
      .on_request(move |d| tracing::debug!("{prefix}: request {d:?}"))
  }
}

#[derive(Clone)]
pub struct HandleEvents<S: Publisher> {
  pub(crate) source: S,
  pub(crate) events: Events<S::Output, S::Failure>,
}

impl<S: Publisher> Publisher for HandleEvents<S> {
  type Output = S::Output;
  type Failure = S::Failure;

  fn subscribe<O>(self, subscriber: O)
  where
    O: Subscriber<S::Output, S::Failure> + 'static,
  {
    self
      .source
      .subscribe(HandleEventsSubscriber { downstream: subscriber, events: self.events })
  }
}

pub struct HandleEventsSubscriber<O, T, E> {
  downstream: O,
  events: Events<T, E>,
}

impl<T, E, O> Subscriber<T, E> for HandleEventsSubscriber<O, T, E>
where
  O: Subscriber<T, E>,
{
  fn receive_subscription(&mut self, subscription: AnySubscription) {
    if let Some(hook) = &self.events.on_subscription {
      hook();
    }
    let subscription = Arc::new(EventsSubscription {
      upstream: subscription,
      on_cancel: self.events.on_cancel.clone(),
      on_request: self.events.on_request.clone(),
    });
    self.downstream.receive_subscription(subscription)
  }

  fn receive(&mut self, input: T) -> Demand {
    if let Some(hook) = &self.events.on_output {
      hook(&input);
    }
    self.downstream.receive(input)
  }

  fn receive_completion(&mut self, completion: Completion<E>) {
    if let Some(hook) = &self.events.on_completion {
      hook(&completion);
    }
    self.downstream.receive_completion(completion)
  }
}

struct EventsSubscription {
  upstream: AnySubscription,
  on_cancel: Option<Hook>,
  on_request: Option<RequestHook>,
}

impl Subscription for EventsSubscription {
  fn request(&self, demand: Demand) {
    if let Some(hook) = &self.on_request {
      hook(demand);
    }
    self.upstream.request(demand)
  }

  fn cancel(&self) {
    if let Some(hook) = &self.on_cancel {
      hook();
    }
    self.upstream.cancel()
  }
}
