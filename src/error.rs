//! Error taxonomy for the driver.
use thiserror::Error;

/// A list specifying categories of [`DrdaError`].
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum DrdaError {
    /// A socket read/write error, an unexpected EOF, or a framing assertion
    /// (magic byte, length mismatch) failed. The session must be considered
    /// permanently closed afterwards.
    #[error("transport error: {0}")]
    TransportError(String),

    /// The underlying transport was closed (EOF) while more bytes were
    /// expected.
    #[error("transport closed unexpectedly")]
    TransportClosed,

    /// I/O error propagated from the socket or TLS layer.
    #[error(transparent)]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// TLS handshake or configuration failure.
    #[error("TLS error: {0}")]
    Tls(String),

    #[error(transparent)]
    TlsProtocol {
        #[from]
        source: rustls::Error,
    },

    #[error(transparent)]
    TlsInvalidDnsName {
        #[from]
        source: rustls::client::InvalidDnsNameError,
    },

    /// A structural parser invariant was violated (SQLCAGRP/SQLCAXGRP
    /// markers, QRYDSC triplet header, FDODSC magic, DSS magic byte).
    #[error("protocol error: {0}")]
    ProtocolError(String),

    /// The server reported a negative SQLCODE.
    #[error("operational error: sqlcode={sqlcode} sqlstate={sqlstate} {message}")]
    OperationalError {
        sqlcode: i32,
        sqlstate: String,
        message: String,
    },

    /// The server refused the request at a level above a single SQLCODE
    /// (e.g. RDBNFNRM - database not found).
    #[error("database error: {0}")]
    DatabaseError(String),

    /// The caller asked for a feature this driver does not implement
    /// (scrollable cursors, stored procedures via `callproc`).
    #[error("not supported: {0}")]
    NotSupportedError(&'static str),

    /// Caller misuse not tied to a specific unsupported feature.
    #[error("usage error: {0}")]
    Usage(&'static str),

    /// Caller misuse, with a dynamic message.
    #[error("usage error: {0}")]
    UsageDetailed(String),

    /// Erroneous connect parameters (e.g. a database name too wide to
    /// truncate sensibly, or an invalid CA bundle path).
    #[error("invalid connection parameters: {0}")]
    ConnParams(String),
}

/// Abbreviation of `Result<T, DrdaError>`.
pub type DrdaResult<T> = std::result::Result<T, DrdaError>;

impl DrdaError {
    pub(crate) fn protocol(msg: impl Into<String>) -> Self {
        Self::ProtocolError(msg.into())
    }

    pub(crate) fn transport(msg: impl Into<String>) -> Self {
        Self::TransportError(msg.into())
    }

    /// Returns `(sqlcode, sqlstate, message)` if this is an
    /// [`DrdaError::OperationalError`].
    #[must_use]
    pub fn server_error(&self) -> Option<(i32, &str, &str)> {
        match self {
            Self::OperationalError {
                sqlcode,
                sqlstate,
                message,
            } => Some((*sqlcode, sqlstate.as_str(), message.as_str())),
            _ => None,
        }
    }
}
