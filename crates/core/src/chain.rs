//! Chains that connect a chat model to the tools it may call.
//!
//! A chain is assembled from named nodes and then compiled. Compiling
//! checks that a chat model node comes first and a tools node directly
//! follows it, and binds the tool definitions to every model request:
//!
//! ```text
//! messages -> [chat model] -> assistant message -> [tools] -> tool messages
//! ```

mod error;
#[cfg(test)]
mod tests;

use quickstart_model::{ModelMessage, ModelProvider, ModelRequest, ModelTool};
use tracing::Instrument;

pub use error::Error;

use crate::model_client::ModelClient;
use crate::tool::ToolsNode;

const CHAT_MODEL: &str = "chat model";
const TOOLS: &str = "tools";

enum Node {
    ChatModel { name: String, client: ModelClient },
    Tools { name: String, node: ToolsNode },
}

impl Node {
    fn name(&self) -> &str {
        match self {
            Node::ChatModel { name, .. } | Node::Tools { name, .. } => name,
        }
    }
}

/// An uncompiled chain of nodes.
#[derive(Default)]
pub struct Chain {
    nodes: Vec<Node>,
}

impl Chain {
    /// Creates an empty chain.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chat model node backed by `provider`.
    #[inline]
    pub fn append_chat_model<P: ModelProvider + 'static>(
        mut self,
        name: impl Into<String>,
        provider: P,
    ) -> Self {
        self.nodes.push(Node::ChatModel {
            name: name.into(),
            client: ModelClient::new(provider),
        });
        self
    }

    /// Appends a tools node.
    #[inline]
    pub fn append_tools_node(
        mut self,
        name: impl Into<String>,
        node: ToolsNode,
    ) -> Self {
        self.nodes.push(Node::Tools {
            name: name.into(),
            node,
        });
        self
    }

    /// Validates the chain and prepares it for invocation.
    pub fn compile(self) -> Result<CompiledChain, Error> {
        for (idx, node) in self.nodes.iter().enumerate() {
            if self.nodes[..idx].iter().any(|n| n.name() == node.name()) {
                return Err(Error::DuplicateNode(node.name().to_owned()));
            }
        }

        let mut nodes = self.nodes.into_iter();
        let (model_name, client) = match nodes.next() {
            Some(Node::ChatModel { name, client }) => (name, client),
            Some(Node::Tools { name, .. }) => {
                return Err(Error::InvalidNodeOrder {
                    node: name,
                    expected: CHAT_MODEL,
                });
            }
            None => return Err(Error::MissingNode(CHAT_MODEL)),
        };
        let (tools_name, tools) = match nodes.next() {
            Some(Node::Tools { name, node }) => (name, node),
            Some(Node::ChatModel { name, .. }) => {
                return Err(Error::InvalidNodeOrder {
                    node: name,
                    expected: TOOLS,
                });
            }
            None => return Err(Error::MissingNode(TOOLS)),
        };
        // Nothing consumes the output of the tools node.
        if let Some(extra) = nodes.next() {
            return Err(Error::InvalidNodeOrder {
                node: extra.name().to_owned(),
                expected: "terminal",
            });
        }

        let definitions = tools.definitions();
        debug!(
            "compiled chain `{model_name}` -> `{tools_name}` with {} tools",
            definitions.len()
        );
        Ok(CompiledChain {
            model_name,
            client,
            tools_name,
            tools,
            definitions,
        })
    }
}

/// A validated chain, ready to be invoked.
pub struct CompiledChain {
    model_name: String,
    client: ModelClient,
    tools_name: String,
    tools: ToolsNode,
    definitions: Vec<ModelTool>,
}

impl CompiledChain {
    /// Returns the tool definitions sent along with every model request.
    #[inline]
    pub fn tools(&self) -> &[ModelTool] {
        &self.definitions
    }

    /// Runs the chain on `messages`.
    ///
    /// The messages are sent to the chat model, and the tool calls in its
    /// reply are executed. Returns one tool message per call.
    pub async fn invoke(
        &self,
        messages: Vec<ModelMessage>,
    ) -> Result<Vec<ModelMessage>, Error> {
        let req = ModelRequest {
            messages,
            tools: self.definitions.clone(),
        };
        let resp = self
            .client
            .send_request(req, |delta| trace!("transcript delta: {delta}"))
            .instrument(debug_span!("chat model node", node = %self.model_name))
            .await
            .map_err(|err| Error::Model {
                kind: err.kind(),
                message: err.to_string(),
            })?;
        debug!(
            "model finished ({:?}) with {} tool calls",
            resp.finish_reason,
            resp.tool_calls.len()
        );

        let msg = resp.into_message();
        self.tools
            .invoke(&msg)
            .instrument(debug_span!("tools node", node = %self.tools_name))
            .await
    }
}
