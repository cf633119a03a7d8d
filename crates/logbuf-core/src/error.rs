//! Error taxonomy shared by the sinks and the registry.

use thiserror::Error;

/// Errors surfaced by sink operations.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Operation attempted on a sink after it was closed. Never retried
    /// internally.
    #[error("sink is closed")]
    Closed,

    /// Flush attempted with no writable destination configured.
    #[error("no output target configured")]
    OutputNotConfigured,

    /// Failure from the underlying file or remote-store operation.
    ///
    /// Buffered records are retained; the next timer or threshold event
    /// retries.
    #[error("backend i/o failed: {source}")]
    Backend {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl SinkError {
    /// Wrap a backend failure without naming its concrete error type.
    pub fn backend(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend {
            source: Box::new(source),
        }
    }
}

impl From<std::io::Error> for SinkError {
    fn from(source: std::io::Error) -> Self {
        Self::Backend {
            source: Box::new(source),
        }
    }
}
