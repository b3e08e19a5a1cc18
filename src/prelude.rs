//! Prelude module for convenient imports

pub use std::convert::Infallible;

#[cfg(feature = "json")]
pub use crate::ops::JsonDecoder;
pub use crate::{
  error::{BoxError, StreamError},
  ops::{Events, TopLevelDecoder},
  publisher::{
    deferred, empty, fail, from_iter, from_result, future, just, never, record,
    BoxedClonePublisher, BoxedPublisher, Deferred, Empty, Future as FuturePublisher, Promise,
    Publisher, PublisherExt, Record, Recording, Sequence,
  },
  scheduler::{new_thread, ImmediateScheduler, NewThreadScheduler, Scheduler, TestScheduler},
  subject::{CurrentValueSubject, PassthroughSubject, Subject},
  subscriber::{Assign, Completion, Demand, Sink, Subscriber},
  subscription::{
    AnyCancellable, AnySubscription, EmptySubscription, Subscription, SubscriptionProxy,
  },
};
