//! # rxcombine: demand-driven reactive streams
//!
//! Publishers produce a sequence of values followed by at most one
//! completion. Subscribers receive them and say how many more they want.
//! Operators wrap publishers, subjects are fed by hand, and schedulers move
//! work between threads.
//!
//! ## Quick Start
//!
//! ```rust
//! use rxcombine::prelude::*;
//!
//! let _cancellable = from_iter(0..10)
//!   .filter(|v| v % 2 == 0)
//!   .map(|v| v * 2)
//!   .sink(|v| println!("Value: {}", v));
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Publisher`] | Source of values and one completion; operators live on [`PublisherExt`] |
//! | [`Subscriber`] | Receives a subscription, values and a completion |
//! | [`Subscription`] | Link used to request more values or cancel |
//! | [`AnyCancellable`] | Cancels its subscription when dropped |
//! | [`Subject`] | Publisher fed by hand |
//! | [`Scheduler`] | Execution context for `subscribe_on` and `receive_on` |
//!
//! ## Feature Flags
//!
//! - **`futures-scheduler`** (default): `futures::executor::ThreadPool` as a scheduler
//! - **`json`** (default): `JsonDecoder` for the `decode` operator
//! - **`tokio-scheduler`**: `tokio::runtime::Handle` as a scheduler
//!
//! [`Publisher`]: publisher::Publisher
//! [`PublisherExt`]: publisher::PublisherExt
//! [`Subscriber`]: subscriber::Subscriber
//! [`Subscription`]: subscription::Subscription
//! [`AnyCancellable`]: subscription::AnyCancellable
//! [`Subject`]: subject::Subject
//! [`Scheduler`]: scheduler::Scheduler

pub mod error;
pub mod ops;
pub mod prelude;
pub mod publisher;
pub mod rc;
pub mod scheduler;
pub mod subject;
pub mod subscriber;
pub mod subscription;

pub use prelude::*;

// README examples run as doctests.
#[cfg(doctest)]
mod __markdown_doctests {
  mod readme {
    #![doc = include_str!("../README.md")]
  }
}
