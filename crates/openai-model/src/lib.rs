//! A model provider for OpenAI-compatible APIs.
//!
//! Requests go through an [`HttpSender`], so the provider can be put
//! behind any transport, e.g. a [`HeaderTransport`] that supplies the
//! credentials a gateway expects:
//!
//! ```no_run
//! use quickstart_openai_model::{OpenAIConfigBuilder, OpenAIProvider};
//! use quickstart_transport::{HeaderSet, HeaderTransport};
//!
//! # fn main() -> Result<(), quickstart_transport::HeaderSetError> {
//! let headers = HeaderSet::try_from_pairs([("api-key", "secret")])?;
//! let transport = HeaderTransport::new(reqwest::Client::new(), headers);
//! let config = OpenAIConfigBuilder::new()
//!     .with_base_url("https://gateway.example.com/v1")
//!     .with_model("gpt-4o-mini")
//!     .build();
//! let provider = OpenAIProvider::with_sender(config, transport);
//! # let _ = provider;
//! # Ok(())
//! # }
//! ```
//!
//! [`HeaderTransport`]: quickstart_transport::HeaderTransport

#[macro_use]
extern crate tracing;

mod config;
mod io;
mod proto;
mod response;

use mime::Mime;
use quickstart_model::{
    ErrorKind, ModelProvider, ModelProviderError, ModelRequest,
};
use quickstart_transport::HttpSender;
use reqwest::header::{self, HeaderValue};
use reqwest::{Client, Method, Request, StatusCode, Url};
use thiserror::Error as ThisError;

pub use config::{OpenAIConfig, OpenAIConfigBuilder};
use io::{Chunks, Sse};
pub use response::OpenAIResponse;

/// Error type for [`OpenAIProvider`].
#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// OpenAI-compatible model provider.
///
/// `S` is the transport used to reach the endpoint, a plain
/// [`reqwest::Client`] unless specified otherwise.
#[derive(Clone, Debug)]
pub struct OpenAIProvider<S = Client> {
    sender: S,
    config: OpenAIConfig,
}

impl OpenAIProvider {
    /// Creates a new `OpenAIProvider` with the given configuration.
    #[inline]
    pub fn new(config: OpenAIConfig) -> Self {
        Self::with_sender(config, Client::new())
    }
}

impl<S: HttpSender> OpenAIProvider<S> {
    /// Creates a new `OpenAIProvider` that sends requests through
    /// `sender`.
    #[inline]
    pub fn with_sender(config: OpenAIConfig, sender: S) -> Self {
        Self { sender, config }
    }

    /// Returns the configuration of this provider.
    #[inline]
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }
}

impl<S: HttpSender> ModelProvider for OpenAIProvider<S> {
    type Error = Error;
    type Response = OpenAIResponse;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static
    {
        let resp_fut = build_http_request(req, &self.config)
            .map(|http_req| self.sender.send(http_req));

        async move {
            let resp = resp_fut?.await.map_err(|err| {
                Error::new(format!("{err}"), ErrorKind::Transport)
            })?;

            let status = resp.status();
            if !status.is_success() {
                let kind = if status == StatusCode::TOO_MANY_REQUESTS {
                    ErrorKind::RateLimitExceeded
                } else {
                    ErrorKind::Other
                };
                let body = resp.text().await.unwrap_or_default();
                return Err(Error::new(
                    format!("unexpected status {status}: {body}"),
                    kind,
                ));
            }

            let content_type = resp
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok());
            let is_event_stream = content_type
                .and_then(|v| v.parse().ok())
                .map(|m: Mime| m.essence_str() == "text/event-stream")
                .unwrap_or(false);
            if !is_event_stream {
                return Err(Error::new(
                    format!("unexpected content type: {content_type:?}"),
                    ErrorKind::Other,
                ));
            }

            // Here we got a successful response.
            debug!("chat completion stream started");
            let chunks = Chunks::from_response(resp);
            let sse = Sse::new(chunks);
            Ok(OpenAIResponse::from_sse(sse))
        }
    }
}

fn build_http_request(
    req: &ModelRequest,
    config: &OpenAIConfig,
) -> Result<Request, Error> {
    let url = format!("{}/chat/completions", config.base_url);
    let url = Url::parse(&url).map_err(|err| {
        Error::new(format!("invalid base url `{url}`: {err}"), ErrorKind::Other)
    })?;
    let body = serde_json::to_vec(&proto::create_request(req, config))
        .map_err(|err| Error::new(format!("{err}"), ErrorKind::Other))?;
    trace!("sending a chat completion request to {url}");

    let mut http_req = Request::new(Method::POST, url);
    let headers = http_req.headers_mut();
    if let Some(api_key) = &config.api_key {
        let mut value = HeaderValue::try_from(format!("Bearer {api_key}"))
            .map_err(|_| {
                let message = "api key is not a valid header value";
                Error::new(message, ErrorKind::Other)
            })?;
        value.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, value);
    }
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static("text/event-stream"),
    );
    *http_req.body_mut() = Some(body.into());
    Ok(http_req)
}
