use std::error::Error as StdError;

use thiserror::Error;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// An error returned by an [`HttpSender`](crate::HttpSender).
///
/// The transport layer never produces errors of its own; this type only
/// carries whatever the underlying sender failed with.
#[derive(Debug, Error)]
#[error("transport error: {source}")]
pub struct TransportError {
    source: BoxError,
}

impl TransportError {
    /// Wraps an underlying error.
    #[inline]
    pub fn new<E: Into<BoxError>>(err: E) -> Self {
        Self { source: err.into() }
    }

    /// Returns a reference to the underlying error.
    #[inline]
    pub fn get_ref(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.source.as_ref()
    }

    /// Attempts to downcast the underlying error to a concrete type.
    #[inline]
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.source.downcast_ref()
    }

    /// Consumes the error, returning the underlying one.
    #[inline]
    pub fn into_inner(self) -> BoxError {
        self.source
    }
}

/// An error raised while building a [`HeaderSet`](crate::HeaderSet).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum HeaderSetError {
    /// The header name is not a valid HTTP header name.
    #[error("invalid header name `{0}`")]
    InvalidName(String),
    /// The value contains characters not allowed in a header value.
    #[error("invalid value for header `{0}`")]
    InvalidValue(String),
}
