//! A request pipeline of the kind applications build on top of the crate:
//! a transport publisher, status validation, JSON decoding and a UI label
//! fed through `assign`. Transport and UI are fakes.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex},
};

use rxcombine::prelude::*;
use serde::Deserialize;

#[derive(Clone, Debug)]
struct Response {
  status: u16,
  body: Option<Vec<u8>>,
}

trait Transport {
  fn get(&self, url: &str) -> BoxedClonePublisher<Response, StreamError>;
}

/// Serves canned responses and counts the requests it sees. A host can be
/// scripted to fail a number of times before answering.
#[derive(Clone, Default)]
struct FakeTransport {
  routes: HashMap<String, Response>,
  flaky: Arc<Mutex<HashMap<String, usize>>>,
  requests: Arc<Mutex<Vec<String>>>,
}

impl FakeTransport {
  fn route(mut self, url: &str, status: u16, body: Option<&str>) -> Self {
    let body = body.map(|b| b.as_bytes().to_vec());
    self.routes.insert(url.to_owned(), Response { status, body });
    self
  }

  fn fail_first(self, url: &str, times: usize) -> Self {
    self.flaky.lock().unwrap().insert(url.to_owned(), times);
    self
  }

  fn request_count(&self) -> usize { self.requests.lock().unwrap().len() }
}

impl Transport for FakeTransport {
  fn get(&self, url: &str) -> BoxedClonePublisher<Response, StreamError> {
    let url = url.to_owned();
    let transport = self.clone();
    deferred(move || {
      transport.requests.lock().unwrap().push(url.clone());
      let mut flaky = transport.flaky.lock().unwrap();
      let result = match flaky.get_mut(&url) {
        Some(left) if *left > 0 => {
          *left -= 1;
          Err(StreamError::InvalidResponse)
        }
        _ => transport.routes.get(&url).cloned().ok_or(StreamError::InvalidResponse),
      };
      from_result(result)
    })
    .box_it_clone()
  }
}

#[derive(Debug, Deserialize, PartialEq)]
struct Forecast {
  city: String,
  celsius: f32,
}

fn forecast_url(city: &str) -> Result<String, StreamError> {
  if city.is_empty() || !city.chars().all(|c| c.is_ascii_alphabetic()) {
    return Err(StreamError::MalformedUrl(format!("https://weather.test/{city}")));
  }
  Ok(format!("https://weather.test/forecast?city={}", city.to_lowercase()))
}

fn check_status(response: Response) -> Result<Vec<u8>, StreamError> {
  if !(200..300).contains(&response.status) {
    return Err(StreamError::UnsuccessfulStatus(response.status));
  }
  response.body.ok_or(StreamError::MissingData)
}

fn fetch_forecast(
  transport: &impl Transport,
  city: &str,
  retries: usize,
) -> BoxedPublisher<Forecast, StreamError> {
  match forecast_url(city) {
    Ok(url) => transport
      .get(&url)
      .retry(retries)
      .try_map(check_status)
      .decode::<Forecast, _>(JsonDecoder)
      .box_it(),
    Err(err) => fail::<Forecast, _>(err).box_it(),
  }
}

#[derive(Default)]
struct Label {
  text: String,
  renders: usize,
}

/// Wires a forecast request to a label the way a view model would: the text
/// lives in a subject, the label is assigned from it.
fn show(
  request: BoxedPublisher<Forecast, StreamError>,
  label: &Arc<Mutex<Label>>,
) -> (AnyCancellable, AnyCancellable) {
  let text = CurrentValueSubject::<String, Infallible>::new("loading".to_owned());
  let binding = text.clone().assign(label.clone(), |label, text| {
    label.text = text;
    label.renders += 1;
  });
  let c_text = text.clone();
  let request = request.sink_all(
    move |f| text.send(format!("{}: {:.1}°C", f.city, f.celsius)),
    move |completion| {
      if let Completion::Failure(err) = completion {
        c_text.send(format!("error: {err}"));
      }
    },
  );
  (binding, request)
}

const PARIS: &str = r#"{"city":"Paris","celsius":18.5}"#;

#[rxcombine_macro::test]
fn forecast_reaches_the_label() {
  let transport =
    FakeTransport::default().route("https://weather.test/forecast?city=paris", 200, Some(PARIS));
  let label = Arc::new(Mutex::new(Label::default()));
  let _c = show(fetch_forecast(&transport, "Paris", 0), &label);

  let label = label.lock().unwrap();
  assert_eq!(label.text, "Paris: 18.5°C");
  assert_eq!(label.renders, 2);
  assert_eq!(transport.request_count(), 1);
}

#[rxcombine_macro::test]
fn unsuccessful_status_is_shown_as_an_error() {
  let transport =
    FakeTransport::default().route("https://weather.test/forecast?city=oslo", 503, None);
  let label = Arc::new(Mutex::new(Label::default()));
  let _c = show(fetch_forecast(&transport, "Oslo", 0), &label);
  assert_eq!(label.lock().unwrap().text, "error: unsuccessful status code 503");
}

#[rxcombine_macro::test]
fn empty_body_is_missing_data() {
  let transport =
    FakeTransport::default().route("https://weather.test/forecast?city=rome", 204, None);
  let failure = Arc::new(Mutex::new(None));
  let c_failure = failure.clone();
  let _c = fetch_forecast(&transport, "Rome", 0).sink_all(|_| {}, move |c| {
    *c_failure.lock().unwrap() = c.failure().map(|e| matches!(e, StreamError::MissingData))
  });
  assert_eq!(*failure.lock().unwrap(), Some(true));
}

#[rxcombine_macro::test]
fn garbage_payload_fails_decoding() {
  let transport = FakeTransport::default().route(
    "https://weather.test/forecast?city=lima",
    200,
    Some("<html>maintenance</html>"),
  );
  let label = Arc::new(Mutex::new(Label::default()));
  let _c = show(fetch_forecast(&transport, "Lima", 0), &label);
  assert!(label.lock().unwrap().text.starts_with("error: failed to decode payload"));
}

#[rxcombine_macro::test]
fn malformed_city_never_touches_the_transport() {
  let transport = FakeTransport::default();
  let label = Arc::new(Mutex::new(Label::default()));
  let _c = show(fetch_forecast(&transport, "São Paulo", 3), &label);
  assert!(label.lock().unwrap().text.starts_with("error: malformed url"));
  assert_eq!(transport.request_count(), 0);
}

#[rxcombine_macro::test]
fn transient_transport_errors_are_retried() {
  let url = "https://weather.test/forecast?city=paris";
  let transport = FakeTransport::default().route(url, 200, Some(PARIS)).fail_first(url, 2);
  let label = Arc::new(Mutex::new(Label::default()));
  let _c = show(fetch_forecast(&transport, "Paris", 2), &label);
  assert_eq!(label.lock().unwrap().text, "Paris: 18.5°C");
  assert_eq!(transport.request_count(), 3);
}

#[rxcombine_macro::test]
fn retries_run_out() {
  let url = "https://weather.test/forecast?city=paris";
  let transport = FakeTransport::default().route(url, 200, Some(PARIS)).fail_first(url, 5);
  let label = Arc::new(Mutex::new(Label::default()));
  let _c = show(fetch_forecast(&transport, "Paris", 1), &label);
  assert_eq!(label.lock().unwrap().text, "error: invalid response");
  assert_eq!(transport.request_count(), 2);
}

#[rxcombine_macro::test]
fn cancelling_the_request_leaves_the_label_loading() {
  let transport =
    FakeTransport::default().route("https://weather.test/forecast?city=paris", 200, Some(PARIS));
  let scheduler = TestScheduler::new();
  let label = Arc::new(Mutex::new(Label::default()));
  let request = fetch_forecast(&transport, "Paris", 0).subscribe_on(scheduler.clone()).box_it();
  let (_binding, mut request) = show(request, &label);

  request.cancel();
  scheduler.flush();
  assert_eq!(label.lock().unwrap().text, "loading");
  assert_eq!(label.lock().unwrap().renders, 1);
}
