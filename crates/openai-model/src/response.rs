use std::collections::VecDeque;
use std::fmt::{self, Debug};
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use pin_project_lite::pin_project;
use quickstart_model::{
    ErrorKind, ModelFinishReason, ModelResponse, ModelResponseEvent,
    ToolCallRequest,
};
use serde_json::{Value, json};

use crate::Error;
use crate::io::Sse;
use crate::proto::{ChatCompletionChunk, ToolCall};

struct PartialState {
    sse: Sse,
    id: Option<String>,
    // Tool calls arrive in fragments and are only emitted once the model
    // has finished, so that their arguments are complete.
    tool_calls: Vec<ToolCall>,
    pending_events: VecDeque<ModelResponseEvent>,
    finished: bool,
}

impl PartialState {
    fn merge_chunk(&mut self, chunk: ChatCompletionChunk) -> Result<(), Error> {
        // Some gateways send a leading chunk without an id (e.g. content
        // filter results), it doesn't belong to any message.
        if !chunk.id.is_empty()
            && self.id.get_or_insert_with(|| chunk.id.clone()) != &chunk.id
        {
            return Err(Error::new("chunk id mismatch", ErrorKind::Other));
        }

        // Usage-only chunks have no choices at all.
        for choice in chunk.choices {
            if let Some(content) = choice.delta.content {
                if !content.is_empty() {
                    self.pending_events
                        .push_back(ModelResponseEvent::MessageDelta(content));
                }
            }
            for tool_call in choice.delta.tool_calls.into_iter().flatten() {
                self.merge_tool_call(tool_call);
            }
            if let Some(finish_reason) = choice.finish_reason {
                self.finish(Some(&finish_reason));
            }
        }
        Ok(())
    }

    fn merge_tool_call(&mut self, tool_call: ToolCall) {
        let partial_tool_call = match tool_call.index {
            Some(_) => self
                .tool_calls
                .iter_mut()
                .find(|t| t.index == tool_call.index),
            // Without an index, a fragment without an id continues the
            // last call.
            None if tool_call.id.is_none() => self.tool_calls.last_mut(),
            None => None,
        };
        let Some(partial_tool_call) = partial_tool_call else {
            self.tool_calls.push(tool_call);
            return;
        };

        // Patch the partial tool call.
        if let Some(id) = tool_call.id {
            partial_tool_call.id.get_or_insert(id);
        }
        if let Some(ty) = tool_call.r#type {
            partial_tool_call.r#type.get_or_insert(ty);
        }
        let Some(function) = tool_call.function else {
            return;
        };
        let partial_func = partial_tool_call.function.get_or_insert_default();
        if let Some(name) = function.name {
            partial_func.name.get_or_insert_default().push_str(&name);
        }
        if let Some(arguments) = function.arguments {
            partial_func
                .arguments
                .get_or_insert_default()
                .push_str(&arguments);
        }
    }

    fn finish(&mut self, finish_reason: Option<&str>) {
        if self.finished {
            return;
        }
        self.finished = true;

        let has_tool_calls = !self.tool_calls.is_empty();
        for tool_call in self.tool_calls.drain(..) {
            let req = into_request(tool_call);
            self.pending_events
                .push_back(ModelResponseEvent::ToolCall(req));
        }
        let finish_reason = match finish_reason {
            Some("tool_calls") => ModelFinishReason::ToolCalls,
            Some(_) => ModelFinishReason::Stop,
            // The stream ended without telling us why.
            None if has_tool_calls => ModelFinishReason::ToolCalls,
            None => ModelFinishReason::Stop,
        };
        self.pending_events
            .push_back(ModelResponseEvent::Completed(finish_reason));
    }
}

fn into_request(tool_call: ToolCall) -> ToolCallRequest {
    let id = tool_call.id.unwrap_or_default();
    let function = tool_call.function.unwrap_or_default();
    let name = function.name.unwrap_or_default();
    let raw_arguments = function.arguments.unwrap_or_default();
    let arguments = if raw_arguments.trim().is_empty() {
        json!({})
    } else {
        serde_json::from_str::<Value>(&raw_arguments).unwrap_or_else(|err| {
            // Leave it to the tool to reject the input.
            warn!("malformed arguments for tool call {id} ({name}): {err}");
            Value::String(raw_arguments)
        })
    };
    ToolCallRequest {
        id,
        name,
        arguments,
    }
}

type PinnedFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;
type NextEvent = Result<(Option<ModelResponseEvent>, PartialState), Error>;

pin_project! {
    /// A streamed chat completion.
    pub struct OpenAIResponse {
        next_event_fut: Option<PinnedFuture<NextEvent>>,
    }
}

impl Debug for OpenAIResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAIResponse")
            .field("finished", &self.next_event_fut.is_none())
            .finish_non_exhaustive()
    }
}

impl OpenAIResponse {
    #[inline]
    pub(crate) fn from_sse(sse: Sse) -> Self {
        let partial_state = PartialState {
            sse,
            id: None,
            tool_calls: Default::default(),
            pending_events: Default::default(),
            finished: false,
        };
        let next_event_fut = async move { next_event(partial_state).await };
        Self {
            next_event_fut: Some(Box::pin(next_event_fut)),
        }
    }
}

impl ModelResponse for OpenAIResponse {
    type Error = crate::Error;

    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>> {
        let this = self.project();
        let Some(next_event_fut) = this.next_event_fut else {
            return Poll::Ready(Ok(None));
        };
        let (event, partial_state) =
            match ready!(next_event_fut.as_mut().poll(cx)) {
                Ok((Some(event), partial_state)) => (event, partial_state),
                Ok((None, _)) => {
                    *this.next_event_fut = None;
                    return Poll::Ready(Ok(None));
                }
                Err(err) => {
                    *this.next_event_fut = None;
                    return Poll::Ready(Err(err));
                }
            };

        // The stream may still have more data to pull, create a new future for
        // the next event.
        let next_event_fut = async move { next_event(partial_state).await };
        *this.next_event_fut = Some(Box::pin(next_event_fut));

        Poll::Ready(Ok(Some(event)))
    }
}

async fn next_event(mut partial_state: PartialState) -> NextEvent {
    loop {
        if let Some(event) = partial_state.pending_events.pop_front() {
            return Ok((Some(event), partial_state));
        }
        if partial_state.finished {
            return Ok((None, partial_state));
        }

        let sse_event = match partial_state.sse.next_event().await {
            Ok(Some(event)) => event,
            Ok(None) => {
                partial_state.finish(None);
                continue;
            }
            Err(err) => {
                return Err(Error::new(
                    format!("{err:?}"),
                    ErrorKind::Transport,
                ));
            }
        };
        trace!("got sse event: {sse_event}");
        if sse_event == "[DONE]" {
            partial_state.finish(None);
            continue;
        }

        let chunk = serde_json::from_str::<ChatCompletionChunk>(&sse_event)
            .map_err(|err| Error::new(format!("{err}"), ErrorKind::Other))?;
        partial_state.merge_chunk(chunk)?;
    }
}
