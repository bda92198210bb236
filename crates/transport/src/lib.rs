//! HTTP transports used to reach model-serving endpoints.
//!
//! Everything that leaves the process goes through an [`HttpSender`].
//! `reqwest::Client` is the plain implementation; [`HeaderTransport`]
//! decorates another sender and stamps a fixed [`HeaderSet`] onto every
//! request before handing it over. Since decorators are senders too, they
//! can be stacked freely.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod error;
mod header;
mod sender;

pub use error::{HeaderSetError, TransportError};
pub use header::{HeaderSet, HeaderTransport};
pub use reqwest::{Request, Response};
pub use sender::HttpSender;
