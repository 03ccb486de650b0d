//! Server core functionality
//!
//! This module contains the accept loop, the shared state handed to
//! each session, and the console shutdown trigger.

pub mod core;

pub use core::{Server, SharedState};
