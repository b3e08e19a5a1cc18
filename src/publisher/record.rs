use super::Sequence;
use crate::subscriber::Completion;

/// A recorded run of values and its completion, replayed to every
/// subscriber.
pub type Record<T, E> = Sequence<Vec<T>, E>;

/// Collects the values and the completion a [`Record`] replays.
pub struct Recording<T, E> {
  values: Vec<T>,
  completion: Option<Completion<E>>,
}

impl<T, E> Recording<T, E> {
  /// Appends a value. Ignored once a completion was recorded.
  pub fn receive(&mut self, value: T) -> &mut Self {
    if self.completion.is_none() {
      self.values.push(value);
    } else {
      tracing::warn!("value recorded after completion, ignored");
    }
    self
  }

  /// Records the completion. Only the first one counts.
  pub fn receive_completion(&mut self, completion: Completion<E>) {
    if self.completion.is_none() {
      self.completion = Some(completion);
    }
  }
}

/// Records a run once through `script`; a recording left open finishes.
pub fn record<T, E>(script: impl FnOnce(&mut Recording<T, E>)) -> Record<T, E> {
  let mut recording = Recording { values: vec![], completion: None };
  script(&mut recording);
  Sequence::new(
    recording.values,
    recording.completion.unwrap_or(Completion::Finished),
  )
}
