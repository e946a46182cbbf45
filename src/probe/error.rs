//! Probe error types.

use thiserror::Error;

/// Failure to obtain a measurement.
///
/// The display text is what ends up in verdict messages.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Host name lookup failed.
    #[error("lookup {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: std::io::Error,
    },

    /// Lookup succeeded but returned nothing usable.
    #[error("lookup {host}: no addresses found")]
    NoAddress { host: String },

    /// ICMP socket could not be opened (usually missing privileges).
    #[error("socket: {0}")]
    Socket(#[source] std::io::Error),

    /// Echo request could not be written.
    #[error("write {addr}: {source}")]
    Send {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading from the ICMP socket failed.
    #[error("read: {0}")]
    Receive(#[source] std::io::Error),

    /// HTTP transport failure (connect, TLS, invalid URL, ...).
    #[error("{0}")]
    Http(#[from] reqwest::Error),
}
