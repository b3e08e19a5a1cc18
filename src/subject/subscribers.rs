use smallvec::SmallVec;

use crate::subscriber::{conduit::Conduit, Completion};

/// Conduits that accepted a broadcast and need draining once the registry
/// lock is released.
pub(crate) type Pending<T, E> = SmallVec<[Conduit<T, E>; 4]>;

/// The subscribers attached to a subject, keyed by the id their
/// subscription uses to detach.
pub(crate) struct Subscribers<T, E> {
  live: Vec<(usize, Conduit<T, E>)>,
  next_id: usize,
}

impl<T, E> Default for Subscribers<T, E> {
  fn default() -> Self { Self { live: Vec::new(), next_id: 0 } }
}

impl<T, E> Subscribers<T, E>
where
  T: Send + 'static,
  E: Send + 'static,
{
  /// Add a subscriber and return its id.
  pub(crate) fn add(&mut self, conduit: Conduit<T, E>) -> usize {
    let id = self.next_id;
    self.next_id += 1;
    self.live.push((id, conduit));
    id
  }

  pub(crate) fn remove(&mut self, id: usize) -> Option<Conduit<T, E>> {
    let pos = self.live.iter().position(|(i, _)| *i == id)?;
    Some(self.live.remove(pos).1)
  }

  #[inline]
  pub(crate) fn len(&self) -> usize { self.live.len() }

  /// Offers `value` to every subscriber with outstanding demand. The last
  /// subscriber receives the moved value instead of a clone.
  pub(crate) fn broadcast_value(&mut self, value: T) -> Pending<T, E>
  where
    T: Clone,
  {
    let mut accepted = Pending::new();
    let mut value = Some(value);
    let last = self.live.len().saturating_sub(1);
    for (idx, (_, conduit)) in self.live.iter().enumerate() {
      let offer = if idx == last { value.take() } else { value.clone() };
      if let Some(offer) = offer {
        if conduit.enqueue_offer(offer) {
          accepted.push(conduit.clone());
        }
      }
    }
    accepted
  }

  /// Queues the completion for every subscriber and empties the registry.
  pub(crate) fn broadcast_completion(&mut self, completion: Completion<E>) -> Pending<T, E>
  where
    E: Clone,
  {
    let mut pending = Pending::new();
    for (_, conduit) in self.live.drain(..) {
      conduit.enqueue_completion(completion.clone());
      pending.push(conduit);
    }
    pending
  }
}
