//! The producing side of a stream and the operator chaining surface.

use std::{
  convert::Infallible,
  fmt::Debug,
  sync::{Arc, Mutex},
};

use crate::{
  error::{BoxError, StreamError},
  ops::{
    combine_latest::CombineLatest,
    decode::{Decode, TopLevelDecoder},
    filter::Filter,
    flat_map::FlatMap,
    handle_events::{Events, HandleEvents},
    map::Map,
    map_err::{MapErr, SetFailureType},
    merge::Merge,
    receive_on::ReceiveOn,
    retry::Retry,
    subscribe_on::SubscribeOn,
    try_map::TryMap,
    zip::Zip,
  },
  scheduler::Scheduler,
  subscriber::{Assign, Completion, Sink, Subscriber},
  subscription::AnyCancellable,
};

mod boxed;
mod deferred;
mod empty;
mod future;
mod record;
mod sequence;

pub use boxed::{BoxedClonePublisher, BoxedPublisher};
pub use deferred::{deferred, Deferred};
pub use empty::{empty, never, Empty};
pub use future::{future, Future, Promise};
pub use record::{record, Record, Recording};
pub use sequence::{fail, from_iter, from_result, just, Sequence};

/// A source of values.
///
/// `subscribe` consumes the publisher. Publishers are `Clone`: cloning a
/// cold publisher gives an independent run per subscription, cloning a
/// subject gives another handle onto the same live stream.
pub trait Publisher: Sized {
  type Output: Send + 'static;
  type Failure: Send + 'static;

  fn subscribe<S>(self, subscriber: S)
  where
    S: Subscriber<Self::Output, Self::Failure> + 'static;
}

/// Operators and terminal subscribers available on every publisher.
pub trait PublisherExt: Publisher {
  /// Transforms every value with `f`.
  #[inline]
  fn map<B, F>(self, f: F) -> Map<Self, F>
  where
    F: FnMut(Self::Output) -> B,
  {
    Map { source: self, func: f }
  }

  /// Forwards only the values satisfying `predicate`.
  #[inline]
  fn filter<F>(self, predicate: F) -> Filter<Self, F>
  where
    F: FnMut(&Self::Output) -> bool,
  {
    Filter { source: self, predicate }
  }

  /// Transforms every value with a fallible `f`. The first `Err` cancels
  /// upstream and fails the stream.
  #[inline]
  fn try_map<B, E, F>(self, f: F) -> TryMap<Self, F, E>
  where
    F: FnMut(Self::Output) -> Result<B, E>,
    Self::Failure: Into<E>,
  {
    TryMap::new(self, f)
  }

  #[inline]
  fn map_err<E, F>(self, f: F) -> MapErr<Self, F>
  where
    F: FnMut(Self::Failure) -> E,
  {
    MapErr { source: self, func: f }
  }

  /// Gives a stream that never fails any failure type, so it can be
  /// combined with fallible ones.
  #[inline]
  fn set_failure_type<E>(self) -> SetFailureType<Self, E>
  where
    Self: Publisher<Failure = Infallible>,
  {
    SetFailureType::new(self)
  }

  /// Runs side effects at every lifecycle event without altering the stream.
  #[inline]
  fn handle_events(self, events: Events<Self::Output, Self::Failure>) -> HandleEvents<Self> {
    HandleEvents { source: self, events }
  }

  /// Logs every lifecycle event at debug level, tagged with `prefix`.
  fn print(self, prefix: impl Into<String>) -> HandleEvents<Self>
  where
    Self::Output: Debug,
    Self::Failure: Debug,
  {
    HandleEvents { source: self, events: Events::logging(prefix.into()) }
  }

  /// Decodes every value with `decoder`, failing with
  /// [`StreamError::Decode`] on the first undecodable one.
  #[inline]
  fn decode<T, D>(self, decoder: D) -> Decode<Self, D, T>
  where
    D: TopLevelDecoder<T, Input = Self::Output>,
    D::Error: Into<BoxError>,
    Self::Failure: Into<StreamError>,
  {
    Decode::new(self, decoder)
  }

  /// Resubscribes up to `attempts` times when the stream fails.
  #[inline]
  fn retry(self, attempts: usize) -> Retry<Self>
  where
    Self: Clone,
  {
    Retry { source: self, attempts }
  }

  /// Maps every value to a publisher and merges everything those emit.
  #[inline]
  fn flat_map<Q, F>(self, f: F) -> FlatMap<Self, F>
  where
    F: FnMut(Self::Output) -> Q,
    Q: Publisher<Failure = Self::Failure>,
  {
    FlatMap { source: self, func: f }
  }

  /// Interleaves the values of both publishers.
  #[inline]
  fn merge<B>(self, other: B) -> Merge<Self, B>
  where
    B: Publisher<Output = Self::Output, Failure = Self::Failure>,
  {
    Merge { source_a: self, source_b: other }
  }

  /// Pairs the n-th value of each publisher.
  #[inline]
  fn zip<B>(self, other: B) -> Zip<Self, B>
  where
    B: Publisher<Failure = Self::Failure>,
  {
    Zip { source_a: self, source_b: other }
  }

  /// Emits the latest value of both sides whenever either emits, once both
  /// have emitted.
  #[inline]
  fn combine_latest<B>(self, other: B) -> CombineLatest<Self, B>
  where
    B: Publisher<Failure = Self::Failure>,
    Self::Output: Clone,
    B::Output: Clone,
  {
    CombineLatest { source_a: self, source_b: other }
  }

  /// Performs the subscription and upstream demand requests on `scheduler`.
  #[inline]
  fn subscribe_on<S: Scheduler + Clone>(self, scheduler: S) -> SubscribeOn<Self, S> {
    SubscribeOn { source: self, scheduler }
  }

  /// Delivers values and the completion on `scheduler`, in order.
  #[inline]
  fn receive_on<S: Scheduler>(self, scheduler: S) -> ReceiveOn<Self, S> {
    ReceiveOn { source: self, scheduler }
  }

  #[inline]
  fn box_it(self) -> BoxedPublisher<Self::Output, Self::Failure>
  where
    Self: Send + 'static,
  {
    BoxedPublisher::new(self)
  }

  #[inline]
  fn box_it_clone(self) -> BoxedClonePublisher<Self::Output, Self::Failure>
  where
    Self: Clone + Send + 'static,
  {
    BoxedClonePublisher::new(self)
  }

  /// Subscribes with a closure receiving every value of a stream that
  /// cannot fail.
  fn sink<N>(self, on_value: N) -> AnyCancellable
  where
    Self: Publisher<Failure = Infallible>,
    N: FnMut(Self::Output) + Send + 'static,
  {
    self.sink_all(on_value, |_| {})
  }

  /// Subscribes with a closure per value and one for the completion.
  fn sink_all<N, C>(self, on_value: N, on_completion: C) -> AnyCancellable
  where
    N: FnMut(Self::Output) + Send + 'static,
    C: FnOnce(Completion<Self::Failure>) + Send + 'static,
  {
    let sink = Sink::new(on_value, on_completion);
    let cancellable = sink.cancellable();
    self.subscribe(sink);
    cancellable
  }

  /// Writes every value into `object` through `setter`.
  fn assign<O, F>(self, object: Arc<Mutex<O>>, setter: F) -> AnyCancellable
  where
    Self: Publisher<Failure = Infallible>,
    O: Send + 'static,
    F: FnMut(&mut O, Self::Output) + Send + 'static,
  {
    let assign = Assign::new(object, setter);
    let cancellable = assign.cancellable();
    self.subscribe(assign);
    cancellable
  }
}

impl<P: Publisher> PublisherExt for P {}
