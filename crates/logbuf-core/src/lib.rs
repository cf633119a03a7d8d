//! Backend-agnostic core of the logbuf library.
//!
//! This crate owns everything that is independent of where records
//! ultimately land: the flush/expire policy, the error taxonomy, the
//! in-memory record buffer, the signal plumbing between a sink and its
//! driver, the [`Sink`](ports::Sink) and [`ListStore`](ports::ListStore)
//! ports, and the [`Registry`](registry::Registry) that runs one driver
//! task per registered category plus a single idle-eviction sweeper.
//!
//! Backend crates implement the ports; embedders usually depend on the
//! `logbuf` facade instead of this crate directly.

#![deny(unused_crate_dependencies)]

pub mod buffer;
pub mod config;
pub mod error;
pub mod ports;
pub mod registry;
pub mod signals;

// Re-export commonly used types for convenience
pub use buffer::RecordBuffer;
pub use config::FlushPolicy;
pub use error::SinkError;
pub use ports::{ListStore, Sink};
pub use registry::{Registry, ServiceStat};
pub use signals::SinkSignals;

// Silence unused dev-dependency warnings in non-test builds
#[cfg(test)]
use tokio_test as _;
