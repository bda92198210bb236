use quickstart_model::ErrorKind;
use thiserror::Error as ThisError;

use crate::tool;

/// Errors from compiling or running a chain.
#[derive(Debug, ThisError)]
pub enum Error {
    /// A required node was never appended.
    #[error("chain has no {0} node")]
    MissingNode(&'static str),
    /// Two nodes share the same name.
    #[error("duplicate node name `{0}`")]
    DuplicateNode(String),
    /// A node is placed where its input cannot be produced.
    #[error("node `{node}` is out of order, expected a {expected} node")]
    InvalidNodeOrder {
        /// Name of the misplaced node.
        node: String,
        /// The kind of node expected at that position.
        expected: &'static str,
    },
    /// The chat model failed.
    #[error("model request failed ({kind}): {message}")]
    Model {
        /// Kind reported by the provider.
        kind: ErrorKind,
        /// Message reported by the provider.
        message: String,
    },
    /// The model requested a tool that is not registered.
    #[error("tool `{0}` not found")]
    ToolNotFound(String),
    /// A tool call failed.
    #[error("tool `{name}` failed: {source}")]
    ToolFailed {
        /// Name of the failed tool.
        name: String,
        /// The tool error.
        #[source]
        source: tool::Error,
    },
}
