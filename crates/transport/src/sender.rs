use std::sync::Arc;

use reqwest::{Client, Request, Response};

use crate::TransportError;

/// A type that sends HTTP requests.
///
/// This is the single seam between the model providers (or tools) and the
/// network. Implementations must be usable from many tasks at once.
pub trait HttpSender: Send + Sync {
    /// Sends the request and returns the response.
    ///
    /// The returned future must not borrow `self`. Dropping it cancels
    /// the request, if the implementation supports that.
    fn send(
        &self,
        req: Request,
    ) -> impl Future<Output = Result<Response, TransportError>> + Send + 'static;
}

impl HttpSender for Client {
    fn send(
        &self,
        req: Request,
    ) -> impl Future<Output = Result<Response, TransportError>> + Send + 'static
    {
        // `Client` is a handle around a shared pool, so this is cheap.
        let client = self.clone();
        async move { client.execute(req).await.map_err(TransportError::new) }
    }
}

impl<S: HttpSender> HttpSender for Arc<S> {
    #[inline]
    fn send(
        &self,
        req: Request,
    ) -> impl Future<Output = Result<Response, TransportError>> + Send + 'static
    {
        S::send(&**self, req)
    }
}
