//! Transport-level error taxonomy.
//!
//! These are the failures the retry schedule is consulted about: anything the
//! underlying transport raises while executing one physical attempt. The
//! schedule loop never synthesizes its own error on exhaustion; the last real
//! failure is re-raised unchanged.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Failure raised by a [`Transport`](crate::Transport) while executing a
/// single attempt.
///
/// Cloneable so the same failure can be fed to the retry schedule, carried in
/// an [`AttemptEvent`](crate::AttemptEvent), and still be returned to the
/// caller; sources are shared via `Arc`.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Could not establish a connection to the remote host.
    #[error("failed to connect to {host}")]
    Connect {
        /// Host the connection was attempted against.
        host: String,
    },
    /// The attempt exceeded the transport's time budget.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    /// The connection dropped before a complete response arrived.
    #[error("connection closed before a response arrived")]
    ConnectionClosed,
    /// An I/O error from the socket layer.
    #[error("i/o error: {0}")]
    Io(Arc<std::io::Error>),
    /// Any other transport-specific failure.
    #[error("{0}")]
    Other(Arc<dyn std::error::Error + Send + Sync>),
}

impl TransportError {
    /// Wrap an I/O error.
    pub fn io(error: std::io::Error) -> Self {
        TransportError::Io(Arc::new(error))
    }

    /// Wrap an arbitrary transport failure.
    pub fn other<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        TransportError::Other(Arc::new(error))
    }

    /// Check if this is a connection-establishment failure.
    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Connect { .. })
    }

    /// Check if this is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Check if the connection dropped mid-request.
    pub fn is_connection_closed(&self) -> bool {
        matches!(self, Self::ConnectionClosed)
    }
}

impl From<std::io::Error> for TransportError {
    fn from(error: std::io::Error) -> Self {
        TransportError::io(error)
    }
}
