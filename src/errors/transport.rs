//! Transport-level failures and request deadlines.
//!
//! These are the only failures the request executor retries on its own.

use std::time::Duration;

/// Classification of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The remote host refused the connection
    ConnectionRefused,
    /// The host name could not be resolved
    HostNotFound,
    /// The connection or request timed out at the transport
    TimedOut,
    /// Any other transport failure (TLS, protocol, body read, ...)
    Other,
}

impl TransportErrorKind {
    /// Whether a failure of this kind is expected to clear up on retry.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            TransportErrorKind::ConnectionRefused
                | TransportErrorKind::HostNotFound
                | TransportErrorKind::TimedOut
        )
    }
}

impl std::fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TransportErrorKind::ConnectionRefused => "connection refused",
            TransportErrorKind::HostNotFound => "host not found",
            TransportErrorKind::TimedOut => "timed out",
            TransportErrorKind::Other => "transport failure",
        };
        f.write_str(name)
    }
}

/// A request failed before a response was received.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Transport error ({kind}): {message}")]
pub struct TransportError {
    /// Failure classification
    pub kind: TransportErrorKind,
    /// Diagnostic from the underlying client
    pub message: String,
}

impl TransportError {
    /// Create a transport error of the given kind.
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for a refused connection.
    pub fn connection_refused(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::ConnectionRefused, message)
    }

    /// Shorthand for a DNS failure.
    pub fn host_not_found(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::HostNotFound, message)
    }

    /// Shorthand for a non-transient failure.
    pub fn other(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Other, message)
    }

    /// Whether this failure is expected to clear up on retry.
    pub fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }
}

/// The request exceeded its deadline and was aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Request timeout after {}", deadline_text(.after))]
pub struct TimeoutError {
    /// The deadline that elapsed
    pub after: Duration,
}

impl TimeoutError {
    /// Create a timeout error for the given deadline.
    pub fn new(after: Duration) -> Self {
        Self { after }
    }
}

/// Whole seconds when exact, milliseconds otherwise.
fn deadline_text(after: &Duration) -> String {
    let millis = after.as_millis();
    if millis > 0 && millis % 1000 == 0 {
        format!("{} seconds", after.as_secs())
    } else {
        format!("{millis} ms")
    }
}
