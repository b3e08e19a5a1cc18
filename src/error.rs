use thiserror::Error;

/// Boxed error used for decode and domain failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure type for streams that fetch and decode data from elsewhere.
///
/// Streams whose failures are fully known use their own error type; this one
/// is what `decode` produces and what request pipelines usually settle on.
#[derive(Debug, Error)]
pub enum StreamError {
  #[error("failed to decode payload: {0}")]
  Decode(#[source] BoxError),

  #[error("invalid response")]
  InvalidResponse,

  #[error("response carried no data")]
  MissingData,

  #[error("unsuccessful status code {0}")]
  UnsuccessfulStatus(u16),

  #[error("malformed url `{0}`")]
  MalformedUrl(String),

  #[error("{0}")]
  Domain(BoxError),
}

impl From<std::convert::Infallible> for StreamError {
  fn from(never: std::convert::Infallible) -> Self { match never {} }
}

impl StreamError {
  pub fn decode(err: impl Into<BoxError>) -> Self { StreamError::Decode(err.into()) }

  pub fn domain(err: impl Into<BoxError>) -> Self { StreamError::Domain(err.into()) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[rxcombine_macro::test]
  fn display_messages() {
    assert_eq!(
      StreamError::UnsuccessfulStatus(404).to_string(),
      "unsuccessful status code 404"
    );
    assert_eq!(
      StreamError::MalformedUrl("ht!tp".into()).to_string(),
      "malformed url `ht!tp`"
    );
    assert_eq!(StreamError::domain("quota exceeded").to_string(), "quota exceeded");
  }

  #[rxcombine_macro::test]
  fn decode_keeps_source() {
    use std::error::Error as _;
    let err = StreamError::decode("unexpected end of input");
    assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("unexpected end of input"));
  }
}
