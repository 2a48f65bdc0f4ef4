//! Error types for socket table snapshots.
//!
//! - [`SnapshotError`] - a source could not be read; fatal to the whole pass
//! - [`LineSkip`] - a single line was dropped; never leaves the decoder

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure of a snapshot pass.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// The socket table could not be opened or read.
    #[error("cannot read socket table {}: {source}", .path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Why a body line of the socket table produced no record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LineSkip {
    #[error("expected at least {expected} fields, got {actual}")]
    TooFewFields { expected: usize, actual: usize },

    #[error("endpoint {0:?} is not in ADDRESS:PORT form")]
    MalformedEndpoint(String),

    #[error("{field} {value:?} is not valid hexadecimal")]
    BadHex { field: &'static str, value: String },

    #[error("address {0:?} is neither 8 nor 32 hex digits")]
    AddressLength(String),
}
