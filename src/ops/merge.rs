use super::fan_in::{Branch, FanIn};
use crate::{publisher::Publisher, subscriber::Subscriber};

/// Combines two publishers into one by interleaving their values.
///
/// The merged stream finishes once both sides finished and fails as soon as
/// either side fails, cancelling the other one.
///
/// # Example
///
/// ```
/// use rxcombine::prelude::*;
///
/// let numbers = PassthroughSubject::<i32, Infallible>::new();
/// let even = numbers.clone().filter(|v| *v % 2 == 0);
/// let odd = numbers.clone().filter(|v| *v % 2 != 0);
///
/// let _c = even.merge(odd).sink(|v| println!("{v} "));
/// numbers.send(1);
/// numbers.send(2);
/// ```
#[derive(Clone)]
pub struct Merge<A, B> {
  pub(crate) source_a: A,
  pub(crate) source_b: B,
}

impl<A, B> Publisher for Merge<A, B>
where
  A: Publisher,
  B: Publisher<Output = A::Output, Failure = A::Failure>,
{
  type Output = A::Output;
  type Failure = A::Failure;

  fn subscribe<O>(self, subscriber: O)
  where
    O: Subscriber<A::Output, A::Failure> + 'static,
  {
    let fan_in = FanIn::new(subscriber);
    // Both sides are registered before either runs, so a side finishing
    // synchronously does not finish the merge.
    let (Some(a), Some(b)) = (fan_in.add_upstream(), fan_in.add_upstream()) else {
      return;
    };
    self.source_a.subscribe(Branch::new(fan_in.clone(), a));
    self.source_b.subscribe(Branch::new(fan_in, b));
  }
}
