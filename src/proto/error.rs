use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Result type alias for valkey-http operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the Valkey HTTP service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
    /// The configuration is incomplete or invalid.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the problem.
        message: String,
    },

    /// The service rejected the access key (HTTP 401).
    #[error("authentication failed: {message}")]
    Authentication {
        /// Message reported by the service.
        message: String,
    },

    /// The service answered with an error status other than 401.
    #[error("server returned {status}: {message}")]
    Response {
        /// HTTP status code.
        status: u16,
        /// Message reported by the service, or the status text.
        message: String,
    },

    /// The request never produced a response.
    #[error("connection error: {message}")]
    Connection {
        /// Description of the transport failure.
        message: String,
    },

    /// A successful response carried a body the client could not read.
    #[error("unexpected response: {message}")]
    Protocol {
        /// Description of the malformed body.
        message: String,
    },

    /// The process-scoped client was used before `init`.
    #[error("client not initialized; call init() first")]
    NotInitialized,
}

/// Discriminant of an [`Error`], stable across message changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// See [`Error::Config`].
    Config,
    /// See [`Error::Authentication`].
    Authentication,
    /// See [`Error::Response`].
    Response,
    /// See [`Error::Connection`].
    Connection,
    /// See [`Error::Protocol`].
    Protocol,
    /// See [`Error::NotInitialized`].
    NotInitialized,
}

impl ErrorKind {
    /// Returns the stable name of this kind.
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Config => "ConfigurationError",
            ErrorKind::Authentication => "AuthenticationError",
            ErrorKind::Response => "ResponseError",
            ErrorKind::Connection => "ConnectionError",
            ErrorKind::Protocol => "ProtocolError",
            ErrorKind::NotInitialized => "NotInitializedError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Error {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config { .. } => ErrorKind::Config,
            Error::Authentication { .. } => ErrorKind::Authentication,
            Error::Response { .. } => ErrorKind::Response,
            Error::Connection { .. } => ErrorKind::Connection,
            Error::Protocol { .. } => ErrorKind::Protocol,
            Error::NotInitialized => ErrorKind::NotInitialized,
        }
    }

    /// Returns the HTTP status that produced this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Authentication { .. } => Some(401),
            Error::Response { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        Error::Protocol {
            message: message.into(),
        }
    }
}

/// Transport failure, stripped of the HTTP library's error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFault {
    /// The per-request timeout elapsed.
    Timeout,
    /// DNS resolution or TCP connect failed.
    Connect(String),
    /// Anything else the transport reported.
    Other(String),
}

impl TransportFault {
    pub(crate) fn classify(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportFault::Timeout
        } else if err.is_connect() {
            TransportFault::Connect(err.to_string())
        } else {
            TransportFault::Other(err.to_string())
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Maps an HTTP error status and its body to an [`Error`].
///
/// 401 becomes [`Error::Authentication`]; any other status is reported as
/// [`Error::Response`]. The message is the body's `message` field when the
/// body is a JSON object carrying one, otherwise the status text.
pub fn map_status(status: u16, reason: Option<&str>, body: &[u8]) -> Error {
    let message = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .or_else(|| reason.map(str::to_string))
        .unwrap_or_else(|| format!("HTTP {}", status));

    if status == 401 {
        Error::Authentication { message }
    } else {
        Error::Response { status, message }
    }
}

/// Maps a transport failure to [`Error::Connection`].
pub fn map_transport(fault: TransportFault, timeout: Duration) -> Error {
    let message = match fault {
        TransportFault::Timeout => format!("request timed out after {}ms", timeout.as_millis()),
        TransportFault::Connect(detail) => format!("connection failed: {}", detail),
        TransportFault::Other(detail) => detail,
    };
    Error::Connection { message }
}
