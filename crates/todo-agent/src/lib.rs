//! A TODO agent that talks to an OpenAI-compatible gateway.
//!
//! The gateway authenticates with an `api-key` header, which is injected
//! by a [`HeaderTransport`] wrapped around the HTTP client. The chat model
//! is chained to a tools node holding the TODO tools and a web search.
//!
//! Two binaries are built on top of this crate: `todo-agent` runs the
//! chain once, and `chat` streams a one-turn conversation.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

pub mod config;
pub mod tools;

use quickstart_core::{Chain, CompiledChain, ToolsNode};
use quickstart_openai_model::{OpenAIConfigBuilder, OpenAIProvider};
use quickstart_transport::{
    HeaderSet, HeaderSetError, HeaderTransport, HttpSender,
};
use reqwest::Client;

pub use config::AppConfig;
use tools::{AddTodoTool, ListTodoTool, SearchTool, UpdateTodoTool};

/// The transport used to reach the gateway.
pub type GatewayTransport = HeaderTransport<Client>;

/// Re-exports of [`quickstart_core`] crate.
pub mod core {
    pub use quickstart_core::*;
}

/// Builds the headers every gateway request carries.
pub fn gateway_headers(
    config: &AppConfig,
) -> Result<HeaderSet, HeaderSetError> {
    HeaderSet::try_from_pairs([
        ("api-key", config.api_key.as_str()),
        ("Content-Type", "application/json"),
    ])
}

/// Wraps a fresh HTTP client so that it authenticates with the gateway.
#[inline]
pub fn gateway_transport(
    config: &AppConfig,
) -> Result<GatewayTransport, HeaderSetError> {
    Ok(HeaderTransport::new(Client::new(), gateway_headers(config)?))
}

/// Creates the chat model provider for `config`.
///
/// The provider sends no bearer token, the credentials come from
/// `sender`.
pub fn chat_model<S: HttpSender>(
    config: &AppConfig,
    sender: S,
    temperature: Option<f32>,
) -> OpenAIProvider<S> {
    let mut builder = OpenAIConfigBuilder::new()
        .with_base_url(config.api_url.as_str())
        .with_model(config.model_name.as_str());
    if let Some(temperature) = temperature {
        builder = builder.with_temperature(temperature);
    }
    OpenAIProvider::with_sender(builder.build(), sender)
}

/// Creates a tools node with the TODO tools and a web search sending
/// through `search_sender`.
pub fn todo_tools<S: HttpSender + 'static>(search_sender: S) -> ToolsNode {
    ToolsNode::new()
        .with_tool(AddTodoTool::new())
        .with_tool(UpdateTodoTool::new())
        .with_tool(ListTodoTool::new())
        .with_tool(SearchTool::new(search_sender))
}

/// Connects `chat_model` to `tools` and compiles the chain.
pub fn todo_chain<P>(
    chat_model: P,
    tools: ToolsNode,
) -> Result<CompiledChain, quickstart_core::Error>
where
    P: quickstart_model::ModelProvider + 'static,
{
    info!("registered {} tools", tools.len());
    Chain::new()
        .append_chat_model("chat_model", chat_model)
        .append_tools_node("tools", tools)
        .compile()
}
