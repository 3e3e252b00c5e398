//! Error types for the streaming side.
//!
//! Every variant is recoverable from the host loop's point of view: callers
//! downgrade them to "streaming disabled" and keep sampling.

use std::io;

use thiserror::Error;

use crate::streaming::connection::ConnectionState;

/// Streaming failures
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("could not resolve {endpoint}: {source}")]
    AddressResolution {
        endpoint: String,
        #[source]
        source: io::Error,
    },

    #[error("could not connect to {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: io::Error,
    },

    #[error("write failed: {0}")]
    Write(#[from] io::Error),

    #[error("connection is {0:?}, not open")]
    InvalidState(ConnectionState),

    #[error("payload of {0} fields does not fit a length frame")]
    PayloadTooLarge(usize),
}

pub type StreamResult<T> = Result<T, StreamError>;
