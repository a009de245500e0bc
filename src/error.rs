//! Error types.
//!
//! [`Error`] is what controllers return. It is one of two things:
//!
//! - **structured** — a value that knows its own HTTP status and is sent to
//!   the client as-is, in the negotiated format;
//! - **generic** — anything else. The client only ever sees a fixed 500
//!   message ([`Error500`]); the real error goes to the log.
//!
//! `?` on any `std::error::Error` produces a generic error. Structured errors
//! are built explicitly with [`Error::structured`].
//!
//! [`ServeError`] is the odd one out: it surfaces server infrastructure
//! failures (binding, accepting) and never reaches a client.

use std::fmt;
use std::net::AddrParseError;

use serde::{Deserialize, Serialize};

use crate::codec::{self, CodecError};
use crate::format::OutputFormat;
use crate::reply::StatusCoder;

/// A boxed, thread-safe error.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The message sent for every error that does not carry its own status.
pub const GENERIC_MESSAGE: &str = "an unexpected error occurred, please contact an administrator";

// ── Error500 ──────────────────────────────────────────────────────────────────

/// A ready-made structured error with status 500.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Error500 {
    #[serde(rename = "Message")]
    pub message: String,
}

impl Error500 {
    /// The generic, non-leaking 500.
    pub fn new() -> Self {
        Self::with_message(GENERIC_MESSAGE)
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl Default for Error500 {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Error500 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StatusCoder for Error500 {
    fn status_code(&self) -> u16 {
        500
    }
}

// ── Error ─────────────────────────────────────────────────────────────────────

/// The error type controllers return.
pub struct Error {
    kind: Kind,
    cause: Option<BoxError>,
}

enum Kind {
    Structured(Box<dyn Structured>),
    Generic(BoxError),
}

/// Type-erased view of a structured error.
trait Structured: fmt::Display + Send {
    fn status_code(&self) -> u16;
    fn encode(&self, format: OutputFormat) -> Result<Vec<u8>, CodecError>;
}

impl<T> Structured for T
where
    T: StatusCoder + Serialize + fmt::Display + Send,
{
    fn status_code(&self) -> u16 {
        StatusCoder::status_code(self)
    }

    fn encode(&self, format: OutputFormat) -> Result<Vec<u8>, CodecError> {
        codec::encode(self, format)
    }
}

impl Error {
    /// An error sent to the client verbatim, with its own status code.
    ///
    /// ```rust
    /// use restwire::{Error, Error500};
    ///
    /// let err = Error::structured(Error500::with_message("disk full"));
    /// assert_eq!(err.status_code(), Some(500));
    /// ```
    pub fn structured<E>(error: E) -> Self
    where
        E: StatusCoder + Serialize + fmt::Display + Send + 'static,
    {
        Self { kind: Kind::Structured(Box::new(error)), cause: None }
    }

    /// An error the client only sees as a generic 500.
    pub fn generic(error: impl Into<BoxError>) -> Self {
        Self { kind: Kind::Generic(error.into()), cause: None }
    }

    /// A generic error from a message.
    pub fn msg(message: impl fmt::Display) -> Self {
        Self::generic(message.to_string())
    }

    /// Attaches the underlying cause. It is logged, never sent.
    #[must_use]
    pub fn caused_by(mut self, cause: impl Into<BoxError>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// The status carried by a structured error.
    pub fn status_code(&self) -> Option<u16> {
        match &self.kind {
            Kind::Structured(e) => Some(e.status_code()),
            Kind::Generic(_) => None,
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self.kind, Kind::Structured(_))
    }

    /// The attached cause, if any.
    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// The full diagnostic chain: cause, then `source()`s, outermost first.
    pub(crate) fn chain(&self) -> String {
        let mut out = String::new();
        let mut next: Option<&(dyn std::error::Error + 'static)> = match (&self.kind, &self.cause) {
            (_, Some(cause)) => Some(&**cause as &(dyn std::error::Error + 'static)),
            (Kind::Generic(e), None) => e.source(),
            (Kind::Structured(_), None) => None,
        };
        while let Some(err) = next {
            if !out.is_empty() {
                out.push_str(": ");
            }
            out.push_str(&err.to_string());
            next = err.source();
        }
        out
    }

    /// Encodes a structured error; `None` for generic ones.
    pub(crate) fn encode(&self, format: OutputFormat) -> Option<Result<Vec<u8>, CodecError>> {
        match &self.kind {
            Kind::Structured(e) => Some(e.encode(format)),
            Kind::Generic(_) => None,
        }
    }
}

impl<E> From<E> for Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        Self::generic(error)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Kind::Structured(e) => fmt::Display::fmt(e, f),
            Kind::Generic(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Error");
        match &self.kind {
            Kind::Structured(e) => s
                .field("status", &e.status_code())
                .field("message", &format_args!("{e}")),
            Kind::Generic(e) => s.field("generic", e),
        };
        s.field("cause", &self.cause).finish()
    }
}

// ── ServeError ────────────────────────────────────────────────────────────────

/// Failure to start or run the server.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid address `{addr}`: {source}")]
    InvalidAddr {
        addr: String,
        #[source]
        source: AddrParseError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("connection refused")]
    struct Refused;

    #[derive(Debug, thiserror::Error)]
    #[error("query failed")]
    struct QueryFailed(#[source] Refused);

    #[test]
    fn question_mark_yields_a_generic_error() {
        fn connect() -> Result<(), Refused> {
            Err(Refused)
        }

        fn fails() -> Result<(), Error> {
            connect()?;
            Ok(())
        }

        let err = fails().unwrap_err();
        assert!(!err.is_structured());
        assert_eq!(err.status_code(), None);
        assert_eq!(err.to_string(), "connection refused");
    }

    #[test]
    fn structured_errors_keep_their_status() {
        let err = Error::structured(Error500::with_message("nope"));
        assert!(err.is_structured());
        assert_eq!(err.status_code(), Some(500));
        assert_eq!(err.to_string(), "nope");
    }

    #[test]
    fn structured_errors_encode_themselves() {
        let err = Error::structured(Error500::new());
        let body = err.encode(OutputFormat::Json).unwrap().unwrap();
        let decoded: Error500 = serde_json::from_slice(&body).unwrap();
        assert_eq!(decoded.message, GENERIC_MESSAGE);

        assert!(Error::msg("x").encode(OutputFormat::Json).is_none());
    }

    #[test]
    fn error500_wire_shape() {
        let body = serde_json::to_string(&Error500::with_message("down")).unwrap();
        assert_eq!(body, r#"{"Message":"down"}"#);
    }

    #[test]
    fn chain_walks_sources() {
        let err = Error::from(QueryFailed(Refused));
        assert_eq!(err.chain(), "connection refused");

        let err = Error::structured(Error500::new()).caused_by(QueryFailed(Refused));
        assert_eq!(err.chain(), "query failed: connection refused");
        assert!(err.cause().is_some());
    }
}
