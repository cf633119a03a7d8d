//! Local file backend for logbuf.
//!
//! [`FileSink`] buffers records in process memory and appends them to a
//! single local file; [`FileTarget`] is the lazily opened append-mode
//! handle it (and the remote sink) drains into.

pub mod sink;
pub mod target;

pub use sink::FileSink;
pub use target::FileTarget;
