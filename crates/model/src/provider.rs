use std::error::Error;

use crate::error::ErrorKind;
use crate::request::ModelRequest;
use crate::response::ModelResponse;

/// Errors reported by a [`ModelProvider`] or its responses.
///
/// Callers branch on [`kind`](Self::kind) rather than on the concrete type,
/// e.g. to tell a rate limit apart from a broken connection.
pub trait ModelProviderError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;
}

/// A chat model endpoint.
///
/// Providers are shared between tasks and must not keep per-request
/// state. Each call to [`send_request`](Self::send_request) is independent
/// and the provider may be dropped while responses are still streaming.
pub trait ModelProvider: Send + Sync {
    /// The error type of this provider.
    type Error: ModelProviderError;

    /// The streamed response type of this provider.
    type Response: ModelResponse<Error = Self::Error>;

    /// Sends `req` to the model.
    ///
    /// The returned future resolves once the model starts answering. It
    /// owns everything it needs, so `req` can be dropped right after this
    /// call.
    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static;
}
