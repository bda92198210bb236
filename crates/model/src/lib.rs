//! An abstraction layer for chat models.
//!
//! This crate establishes a unified protocol for chains and tools to talk
//! to the supported chat models, so that a provider can be swapped without
//! touching the code that drives it.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to.

#![deny(missing_docs)]

mod error;
mod provider;
mod request;
mod response;

pub use error::*;
pub use provider::*;
pub use request::*;
pub use response::*;
