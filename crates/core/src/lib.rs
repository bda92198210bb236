//! Core building blocks: a type-erased model client, tools, and chains that
//! connect the two.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

pub mod chain;
mod model_client;
pub mod tool;

pub use chain::{Chain, CompiledChain, Error};
pub use model_client::{ModelClient, ModelClientResponse};
pub use tool::{Tool, ToolResult, ToolsNode};
