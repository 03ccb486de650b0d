//! Group management
//!
//! Tracks named groups and their membership.

pub mod registry;

pub use registry::GroupRegistry;
