use std::fmt::{self, Debug};
use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Request, Response};

use crate::{HeaderSetError, HttpSender, TransportError};

/// A fixed set of headers to be stamped onto outgoing requests.
///
/// Names are unique. Names and values are validated when they are added,
/// so applying the set to a request can never fail.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    headers: HeaderMap,
}

impl HeaderSet {
    /// Creates an empty header set.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a header set from `(name, value)` pairs.
    ///
    /// If a name appears more than once, the last value wins.
    pub fn try_from_pairs<I, K, V>(pairs: I) -> Result<Self, HeaderSetError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut set = Self::new();
        for (name, value) in pairs {
            set.insert(name.as_ref(), value.as_ref())?;
        }
        Ok(set)
    }

    /// Adds a header, replacing the previous value of the same name.
    pub fn insert(
        &mut self,
        name: &str,
        value: &str,
    ) -> Result<(), HeaderSetError> {
        let header_name = HeaderName::try_from(name)
            .map_err(|_| HeaderSetError::InvalidName(name.to_owned()))?;
        let mut header_value = HeaderValue::try_from(value)
            .map_err(|_| HeaderSetError::InvalidValue(name.to_owned()))?;
        // Values are usually credentials, keep them out of debug output.
        header_value.set_sensitive(true);
        self.headers.insert(header_name, header_value);
        Ok(())
    }

    /// Returns the value of the given header, if present.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.headers.get(name)
    }

    /// Returns the number of headers in the set.
    #[inline]
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Returns `true` if the set contains no headers.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Writes every header in the set into `headers`, overwriting all
    /// existing values of the same name. Other headers are left alone.
    pub fn apply(&self, headers: &mut HeaderMap) {
        for (name, value) in &self.headers {
            headers.insert(name.clone(), value.clone());
        }
    }
}

impl Debug for HeaderSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.headers.keys().map(|name| (name, "<redacted>")))
            .finish()
    }
}

/// A sender that sets a [`HeaderSet`] on every request and then delegates
/// to the wrapped sender.
///
/// Results from the wrapped sender, successful or not, are returned as-is.
#[derive(Clone, Debug)]
pub struct HeaderTransport<S> {
    inner: S,
    headers: Arc<HeaderSet>,
}

impl<S> HeaderTransport<S> {
    /// Wraps `inner` so that every request carries `headers`.
    #[inline]
    pub fn new(inner: S, headers: HeaderSet) -> Self {
        Self {
            inner,
            headers: Arc::new(headers),
        }
    }

    /// Returns the headers injected by this transport.
    #[inline]
    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    /// Returns a reference to the wrapped sender.
    #[inline]
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Consumes the transport, returning the wrapped sender.
    #[inline]
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: HttpSender> HttpSender for HeaderTransport<S> {
    fn send(
        &self,
        mut req: Request,
    ) -> impl Future<Output = Result<Response, TransportError>> + Send + 'static
    {
        self.headers.apply(req.headers_mut());
        trace!(
            "injected {} header(s) into {} {}",
            self.headers.len(),
            req.method(),
            req.url()
        );
        self.inner.send(req)
    }
}
