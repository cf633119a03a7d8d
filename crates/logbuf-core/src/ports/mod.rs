//! Port definitions (trait abstractions) the lifecycle core drives.
//!
//! Backends implement these; the registry and its drivers depend only on
//! the capability set, never on a concrete storage client.
//!
//! # Design Rules
//!
//! - No file-system or client-crate types in any signature
//! - Intent-based methods (what the core needs, not how a backend does it)

pub mod sink;
pub mod store;

pub use sink::Sink;
pub use store::ListStore;
