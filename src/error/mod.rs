//! Error handling
//!
//! Defines error types and conversions for the chat server.

pub mod types;

pub use types::*;
