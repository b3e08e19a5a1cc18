//! Decoding raw payloads into typed values.

use std::marker::PhantomData;

use super::try_map::TryMapSubscriber;
use crate::{
  error::{BoxError, StreamError},
  publisher::Publisher,
  subscriber::Subscriber,
};

/// Turns one payload into a `T`.
pub trait TopLevelDecoder<T> {
  type Input;
  type Error;

  fn decode(&self, input: Self::Input) -> Result<T, Self::Error>;
}

/// Decodes JSON byte payloads with `serde_json`.
#[cfg(feature = "json")]
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonDecoder;

#[cfg(feature = "json")]
impl<T: serde::de::DeserializeOwned> TopLevelDecoder<T> for JsonDecoder {
  type Input = Vec<u8>;
  type Error = serde_json::Error;

  fn decode(&self, input: Vec<u8>) -> Result<T, serde_json::Error> {
    serde_json::from_slice(&input)
  }
}

pub struct Decode<S, D, T> {
  source: S,
  decoder: D,
  _target: PhantomData<fn() -> T>,
}

impl<S, D, T> Decode<S, D, T> {
  pub(crate) fn new(source: S, decoder: D) -> Self {
    Decode { source, decoder, _target: PhantomData }
  }
}

impl<S: Clone, D: Clone, T> Clone for Decode<S, D, T> {
  fn clone(&self) -> Self { Decode::new(self.source.clone(), self.decoder.clone()) }
}

impl<S, D, T> Publisher for Decode<S, D, T>
where
  S: Publisher,
  S::Failure: Into<StreamError>,
  D: TopLevelDecoder<T, Input = S::Output> + Send + 'static,
  D::Error: Into<BoxError>,
  T: Send + 'static,
{
  type Output = T;
  type Failure = StreamError;

  fn subscribe<O>(self, subscriber: O)
  where
    O: Subscriber<T, StreamError> + 'static,
  {
    let decoder = self.decoder;
    let decode = move |input: S::Output| decoder.decode(input).map_err(StreamError::decode);
    self.source.subscribe(TryMapSubscriber::new(subscriber, decode))
  }
}

#[cfg(all(test, feature = "json"))]
mod tests {
  use std::sync::{Arc, Mutex};

  use serde::Deserialize;

  use crate::prelude::*;

  #[derive(Debug, Deserialize, PartialEq)]
  struct Book {
    title: String,
    pages: u32,
  }

  #[rxcombine_macro::test]
  fn decodes_json_payloads() {
    let payloads = vec![
      br#"{"title":"Dune","pages":412}"#.to_vec(),
      br#"{"title":"Emma","pages":474}"#.to_vec(),
    ];
    let books = Arc::new(Mutex::new(vec![]));
    let c_books = books.clone();
    let _c = from_iter(payloads)
      .decode::<Book, _>(JsonDecoder)
      .sink_all(move |b| c_books.lock().unwrap().push(b), |c| assert!(c.is_finished()));
    assert_eq!(
      *books.lock().unwrap(),
      vec![
        Book { title: "Dune".into(), pages: 412 },
        Book { title: "Emma".into(), pages: 474 },
      ]
    );
  }

  #[rxcombine_macro::test]
  fn malformed_payload_fails_with_decode_error() {
    let failure = Arc::new(Mutex::new(None));
    let c_failure = failure.clone();
    let _c = just(b"{not json".to_vec())
      .decode::<Book, _>(JsonDecoder)
      .sink_all(|_| {}, move |c| {
        *c_failure.lock().unwrap() = c.failure().map(ToString::to_string)
      });
    let failure = failure.lock().unwrap().clone().unwrap();
    assert!(failure.starts_with("failed to decode payload"));
  }
}
