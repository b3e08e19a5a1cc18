//! Type-erased publishers.
//!
//! `box_it` hides a publisher chain behind `BoxedPublisher<O, E>`, so
//! different chains with the same output and failure types can be stored
//! together or returned from one function. `box_it_clone` keeps the boxed
//! publisher clonable.

use super::Publisher;
use crate::subscriber::{BoxedSubscriber, Subscriber};

trait DynPublisher<O, E>: Send {
  fn box_subscribe(self: Box<Self>, subscriber: BoxedSubscriber<O, E>);
}

impl<P> DynPublisher<P::Output, P::Failure> for P
where
  P: Publisher + Send,
{
  fn box_subscribe(self: Box<Self>, subscriber: BoxedSubscriber<P::Output, P::Failure>) {
    (*self).subscribe(subscriber)
  }
}

trait DynClonePublisher<O, E>: Send {
  fn box_subscribe(self: Box<Self>, subscriber: BoxedSubscriber<O, E>);

  fn box_clone(&self) -> Box<dyn DynClonePublisher<O, E>>;
}

impl<P> DynClonePublisher<P::Output, P::Failure> for P
where
  P: Publisher + Clone + Send + 'static,
{
  fn box_subscribe(self: Box<Self>, subscriber: BoxedSubscriber<P::Output, P::Failure>) {
    (*self).subscribe(subscriber)
  }

  fn box_clone(&self) -> Box<dyn DynClonePublisher<P::Output, P::Failure>> {
    Box::new(self.clone())
  }
}

pub struct BoxedPublisher<O, E>(Box<dyn DynPublisher<O, E>>);

impl<O, E> BoxedPublisher<O, E> {
  pub fn new<P>(publisher: P) -> Self
  where
    P: Publisher<Output = O, Failure = E> + Send + 'static,
  {
    BoxedPublisher(Box::new(publisher))
  }
}

impl<O, E> Publisher for BoxedPublisher<O, E>
where
  O: Send + 'static,
  E: Send + 'static,
{
  type Output = O;
  type Failure = E;

  fn subscribe<S>(self, subscriber: S)
  where
    S: Subscriber<O, E> + 'static,
  {
    self.0.box_subscribe(Box::new(subscriber))
  }
}

pub struct BoxedClonePublisher<O, E>(Box<dyn DynClonePublisher<O, E>>);

impl<O, E> BoxedClonePublisher<O, E> {
  pub fn new<P>(publisher: P) -> Self
  where
    P: Publisher<Output = O, Failure = E> + Clone + Send + 'static,
  {
    BoxedClonePublisher(Box::new(publisher))
  }
}

impl<O, E> Clone for BoxedClonePublisher<O, E> {
  fn clone(&self) -> Self { BoxedClonePublisher(self.0.box_clone()) }
}

impl<O, E> Publisher for BoxedClonePublisher<O, E>
where
  O: Send + 'static,
  E: Send + 'static,
{
  type Output = O;
  type Failure = E;

  fn subscribe<S>(self, subscriber: S)
  where
    S: Subscriber<O, E> + 'static,
  {
    self.0.box_subscribe(Box::new(subscriber))
  }
}
