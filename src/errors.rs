/*!
 * Error types for the eduart-aligner application.
 *
 * This module contains custom error types for the request boundary and the
 * HTTP front, using the thiserror crate for ergonomic error definitions.
 * The line aligner itself never fails.
 */

use thiserror::Error;

/// Errors raised while validating an alignment request, before the aligner runs
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// The payload is missing a required field or has the wrong shape
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl RequestError {
    /// HTTP status used to report this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest(_) => 422,
        }
    }
}

/// Errors that can occur while reading an HTTP request off a connection
#[derive(Error, Debug)]
pub enum HttpError {
    /// Request line or headers could not be parsed
    #[error("Malformed request: {0}")]
    Malformed(String),

    /// Request line and headers exceed the head size limit
    #[error("Request head exceeds {limit} bytes")]
    HeadTooLarge {
        /// Maximum head size in bytes
        limit: usize,
    },

    /// Declared body is larger than the configured cap
    #[error("Request body of {actual} bytes exceeds the limit of {limit} bytes")]
    PayloadTooLarge {
        /// Configured cap in bytes
        limit: usize,
        /// Declared Content-Length
        actual: usize,
    },

    /// Body without a Content-Length (chunked or otherwise encoded)
    #[error("Content-Length is required")]
    LengthRequired,

    /// Client did not send a complete request in time
    #[error("Request not received within {0} seconds")]
    Timeout(u64),

    /// Peer closed the connection before sending a request
    #[error("Connection closed by peer")]
    ConnectionClosed,

    /// Socket level failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HttpError {
    /// HTTP status used to report this error, if a response can still be sent
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Malformed(_) => Some(400),
            Self::HeadTooLarge { .. } => Some(431),
            Self::PayloadTooLarge { .. } => Some(413),
            Self::LengthRequired => Some(411),
            Self::Timeout(_) => Some(408),
            Self::ConnectionClosed | Self::Io(_) => None,
        }
    }
}
