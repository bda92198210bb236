use std::fmt::{self, Display, Formatter};
use std::future::ready;
use std::sync::{Arc, Mutex};

use futures_util::future::join_all;
use quickstart_transport::{
    HeaderSet, HeaderTransport, HttpSender, Request, Response, TransportError,
};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode, Url};

#[derive(Debug, PartialEq, Eq)]
struct FakeSendError(&'static str);

impl Display for FakeSendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl std::error::Error for FakeSendError {}

/// Records the headers of every request it sees and answers with a canned
/// response (or error).
#[derive(Default)]
struct RecordingSender {
    seen: Mutex<Vec<HeaderMap>>,
    fail_with: Option<&'static str>,
}

impl RecordingSender {
    fn failing(message: &'static str) -> Self {
        Self {
            seen: Default::default(),
            fail_with: Some(message),
        }
    }

    fn seen(&self) -> Vec<HeaderMap> {
        self.seen.lock().unwrap().clone()
    }
}

impl HttpSender for RecordingSender {
    fn send(
        &self,
        req: Request,
    ) -> impl Future<Output = Result<Response, TransportError>> + Send + 'static
    {
        self.seen.lock().unwrap().push(req.headers().clone());
        let result = match self.fail_with {
            Some(message) => Err(TransportError::new(FakeSendError(message))),
            None => {
                let resp = http::Response::builder()
                    .status(StatusCode::CREATED)
                    .header("x-upstream", "1")
                    .body("upstream body")
                    .unwrap();
                Ok(Response::from(resp))
            }
        };
        ready(result)
    }
}

fn new_request() -> Request {
    let url = Url::parse("https://models.example.com/v1/chat/completions")
        .unwrap();
    let mut req = Request::new(Method::POST, url);
    req.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    req.headers_mut()
        .insert("x-request-id", HeaderValue::from_static("req-1"));
    req
}

fn scenario_headers() -> HeaderSet {
    HeaderSet::try_from_pairs([
        ("api-key", "secret123"),
        ("Content-Type", "application/json"),
    ])
    .unwrap()
}

#[tokio::test]
async fn test_headers_reach_inner_sender() {
    let inner = Arc::new(RecordingSender::default());
    let transport = HeaderTransport::new(Arc::clone(&inner), scenario_headers());

    transport.send(new_request()).await.unwrap();

    let seen = inner.seen();
    assert_eq!(seen.len(), 1);
    let headers = &seen[0];
    assert_eq!(headers.len(), 3);
    assert_eq!(headers["api-key"], "secret123");
    assert_eq!(headers[CONTENT_TYPE], "application/json");
    assert_eq!(headers["x-request-id"], "req-1");
}

#[tokio::test]
async fn test_response_passes_through() {
    let transport =
        HeaderTransport::new(RecordingSender::default(), scenario_headers());

    let resp = transport.send(new_request()).await.unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(resp.headers()["x-upstream"], "1");
    assert_eq!(resp.text().await.unwrap(), "upstream body");
}

#[tokio::test]
async fn test_error_passes_through() {
    let transport = HeaderTransport::new(
        RecordingSender::failing("connection refused"),
        scenario_headers(),
    );

    let err = transport.send(new_request()).await.unwrap_err();

    assert_eq!(
        err.downcast_ref::<FakeSendError>(),
        Some(&FakeSendError("connection refused"))
    );
    let source = std::error::Error::source(&err)
        .and_then(|source| source.downcast_ref::<FakeSendError>());
    assert_eq!(source, Some(&FakeSendError("connection refused")));
    // The request was still decorated before the inner sender failed.
    let seen = transport.get_ref().seen();
    assert_eq!(seen[0]["api-key"], "secret123");
}

#[tokio::test]
async fn test_stacked_transports() {
    let inner = Arc::new(RecordingSender::default());
    let tracing_headers =
        HeaderSet::try_from_pairs([("x-request-id", "req-2")]).unwrap();
    let transport = HeaderTransport::new(
        HeaderTransport::new(Arc::clone(&inner), scenario_headers()),
        tracing_headers,
    );

    transport.send(new_request()).await.unwrap();

    let headers = &inner.seen()[0];
    assert_eq!(headers["x-request-id"], "req-2");
    assert_eq!(headers["api-key"], "secret123");
}

#[tokio::test]
async fn test_applying_twice_matches_once() {
    let inner = Arc::new(RecordingSender::default());
    let once = HeaderTransport::new(Arc::clone(&inner), scenario_headers());
    let twice = HeaderTransport::new(once.clone(), scenario_headers());

    once.send(new_request()).await.unwrap();
    twice.send(new_request()).await.unwrap();

    let seen = inner.seen();
    assert_eq!(seen[0], seen[1]);
}

#[tokio::test]
async fn test_concurrent_sends() {
    let inner = Arc::new(RecordingSender::default());
    let transport =
        Arc::new(HeaderTransport::new(Arc::clone(&inner), scenario_headers()));

    let results =
        join_all((0..16).map(|_| transport.send(new_request()))).await;

    assert!(results.iter().all(Result::is_ok));
    let seen = inner.seen();
    assert_eq!(seen.len(), 16);
    assert!(seen.iter().all(|h| h["api-key"] == "secret123"));
}
