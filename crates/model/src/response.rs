use std::future::poll_fn;
use std::pin::Pin;
use std::task::{self, Poll};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::provider::ModelProviderError;

/// A streamed answer from a model provider.
pub trait ModelResponse: Sized + Send + 'static {
    /// The error type of this response.
    type Error: ModelProviderError;

    /// Polls for the next event of the response.
    ///
    /// Returns `Ok(Some(event))` while events are available and `Ok(None)`
    /// once the response is over, which is also what every later call
    /// returns. `Poll::Pending` registers the current task for wakeup as
    /// usual. An error ends the response.
    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>>;
}

/// Waits for the next event of `resp`.
///
/// This is the `async` counterpart of [`ModelResponse::poll_next_event`].
pub async fn next_event<R: ModelResponse>(
    mut resp: Pin<&mut R>,
) -> Result<Option<ModelResponseEvent>, R::Error> {
    poll_fn(|cx| resp.as_mut().poll_next_event(cx)).await
}

/// Why the model stopped generating.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelFinishReason {
    /// The model is waiting for the results of its tool calls.
    ToolCalls,
    /// The answer is complete.
    Stop,
}

/// A tool call requested by the model.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Identifier the result must be reported with.
    pub id: String,
    /// Name of the tool to call.
    pub name: String,
    /// The arguments to pass to the tool, usually a JSON object.
    pub arguments: Value,
}

/// An event of a streamed response.
///
/// Text arrives as any number of deltas. Tool calls are only delivered
/// once complete, and `Completed` is always the last event.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelResponseEvent {
    /// A piece of generated text.
    MessageDelta(String),
    /// A complete tool call request.
    ToolCall(ToolCallRequest),
    /// The model has finished.
    Completed(ModelFinishReason),
}
