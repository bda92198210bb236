use std::fmt::{self, Debug};

use futures_util::future::join_all;
use quickstart_model::{
    AssistantMessage, ModelMessage, ModelTool, ToolCallResult,
};
use tracing::Instrument;

use crate::chain::Error;
use crate::tool::{AnyTool, Tool, ToolObject};

/// A node that executes the tool calls of an assistant message.
///
/// Every call is started at once and awaited together; the output holds
/// one tool message per call, in the order the model requested them.
#[derive(Default)]
pub struct ToolsNode {
    tools: Vec<Box<dyn ToolObject>>,
}

impl ToolsNode {
    /// Creates an empty tools node.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool. A tool with the same name replaces the previous
    /// one.
    pub fn with_tool<T: Tool>(mut self, tool: T) -> Self {
        let tool: Box<dyn ToolObject> = Box::new(AnyTool(tool));
        match self.tools.iter().position(|t| t.name() == tool.name()) {
            Some(idx) => {
                warn!("tool `{}` registered twice, replacing it", tool.name());
                self.tools[idx] = tool;
            }
            None => self.tools.push(tool),
        }
        self
    }

    /// Returns the number of registered tools.
    #[inline]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns `true` if no tool is registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Returns the definitions of all tools, in registration order.
    #[inline]
    pub fn definitions(&self) -> Vec<ModelTool> {
        self.tools.iter().map(|tool| tool.definition()).collect()
    }

    /// Runs the tool calls in `msg` and returns their results.
    ///
    /// Fails if a requested tool is not registered or any call fails.
    pub async fn invoke(
        &self,
        msg: &AssistantMessage,
    ) -> Result<Vec<ModelMessage>, Error> {
        let mut calls = Vec::with_capacity(msg.tool_calls.len());
        for req in &msg.tool_calls {
            let Some(tool) = self.tools.iter().find(|t| t.name() == req.name)
            else {
                warn!("tool not found: {}", req.name);
                return Err(Error::ToolNotFound(req.name.clone()));
            };
            trace!(
                "spawning a tool ({}) with args: {:?}",
                req.id, req.arguments
            );
            let id = req.id.clone();
            let name = req.name.clone();
            let fut = tool.execute(req.arguments.clone());
            calls.push(async move { (id, name, fut.await) });
        }

        let results = join_all(calls)
            .instrument(debug_span!("tool calls", count = msg.tool_calls.len()))
            .await;
        results
            .into_iter()
            .map(|(id, name, result)| match result {
                Ok(content) => {
                    Ok(ModelMessage::Tool(ToolCallResult { id, name, content }))
                }
                Err(source) => {
                    error!("tool `{name}` ({id}) failed: {source}");
                    Err(Error::ToolFailed { name, source })
                }
            })
            .collect()
    }
}

impl Debug for ToolsNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.tools.iter().map(|t| t.name()))
            .finish()
    }
}
