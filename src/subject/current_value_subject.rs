use super::{
  impl_subject,
  subject_core::{Latest, SubjectCore},
};

/// A subject holding the latest value.
///
/// Every new subscriber first receives the cached value, then whatever is
/// sent afterwards. Completion freezes the cache.
pub struct CurrentValueSubject<T, E> {
  core: SubjectCore<T, E, Latest<T>>,
}

impl<T, E> Clone for CurrentValueSubject<T, E> {
  fn clone(&self) -> Self { CurrentValueSubject { core: self.core.clone() } }
}

impl<T, E> CurrentValueSubject<T, E>
where
  T: Clone + Send + 'static,
  E: Clone + Send + 'static,
{
  pub fn new(value: T) -> Self { CurrentValueSubject { core: SubjectCore::new(Latest(value)) } }

  /// Reads the cached value without subscribing.
  pub fn value(&self) -> T { self.core.state().cache.0.clone() }
}

impl_subject!(CurrentValueSubject);
