//! # Types
//!
//! Error types and the set of valid values for FTP commands

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::reader::StreamError;
use crate::reply::{Reply, ReplyError};

/// A shorthand for a Result whose error type is always an FtpError.
pub type FtpResult<T> = std::result::Result<T, FtpError>;

/// A shorthand for a Result whose error type is always an SmtpError.
pub type SmtpResult<T> = std::result::Result<T, SmtpError>;

/// `FtpError` describes the different kinds of errors that might occur while using FTP.
///
/// Negative replies only become errors in the high level operations; the raw command helpers
/// return them as ordinary [`Reply`] values. Errors raised while talking to the server name the
/// remote host, and the command in flight when there is one.
#[derive(Debug, Error)]
pub enum FtpError {
    /// Connecting, binding or accepting failed
    #[error("Connection error with {host}: {source}")]
    ConnectionError {
        host: String,
        #[source]
        source: std::io::Error,
    },
    /// The control channel is not open
    #[error("Not connected")]
    NotConnected,
    /// Timeout, interruption or I/O failure while talking to the server
    #[error("{operation} on {host}: {source}")]
    Stream {
        operation: String,
        host: String,
        #[source]
        source: StreamError,
    },
    /// The reply line doesn't start with a valid code
    #[error("{operation} on {host}: response contains an invalid syntax: {line:?}")]
    BadResponse {
        operation: String,
        host: String,
        line: String,
    },
    /// The server refused the request or replied something unexpected
    #[error("{operation} failed on {host}: {reply}")]
    UnexpectedResponse {
        operation: String,
        host: String,
        reply: Reply,
    },
    /// The server never connected back to our data port
    #[error("{operation} on {host}: no data connection within {timeout:?}")]
    DataConnectionTimeout {
        operation: String,
        host: String,
        timeout: Duration,
    },
    /// The data channel went quiet before the announced amount of bytes arrived.
    /// Holds what was received.
    #[error(
        "{operation} on {host}: transfer incomplete, expected {expected} bytes, received {}",
        .data.len()
    )]
    IncompleteTransfer {
        operation: String,
        host: String,
        expected: usize,
        data: Vec<u8>,
    },
    /// A directory listing line could not be understood
    #[error("Unsupported directory listing from {host}: {line:?}")]
    UnsupportedListing { host: String, line: String },
    /// No address could be advertised for the data channel
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

impl FtpError {
    /// Attach the command in flight and the remote host to a failure of the stream layer
    pub(crate) fn from_stream(operation: &str, host: &str, source: StreamError) -> Self {
        match source {
            StreamError::NotConnected => Self::NotConnected,
            source => Self::Stream {
                operation: operation.to_string(),
                host: host.to_string(),
                source,
            },
        }
    }

    /// Attach the command in flight and the remote host to a reply reading failure
    pub(crate) fn from_reply(operation: &str, host: &str, err: ReplyError) -> Self {
        match err {
            ReplyError::Stream(source) => Self::from_stream(operation, host, source),
            ReplyError::Malformed(line) => Self::BadResponse {
                operation: operation.to_string(),
                host: host.to_string(),
                line,
            },
        }
    }
}

/// `SmtpError` describes the different kinds of errors that might occur while using SMTP.
#[derive(Debug, Error)]
pub enum SmtpError {
    #[error("Connection error with {host}: {source}")]
    ConnectionError {
        host: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Not connected")]
    NotConnected,
    #[error("{operation} on {host}: {source}")]
    Stream {
        operation: String,
        host: String,
        #[source]
        source: StreamError,
    },
    #[error("{operation} on {host}: response contains an invalid syntax: {line:?}")]
    BadResponse {
        operation: String,
        host: String,
        line: String,
    },
    #[error("{operation} failed on {host}: {reply}")]
    UnexpectedResponse {
        operation: String,
        host: String,
        reply: Reply,
    },
}

impl SmtpError {
    pub(crate) fn from_stream(operation: &str, host: &str, source: StreamError) -> Self {
        match source {
            StreamError::NotConnected => Self::NotConnected,
            source => Self::Stream {
                operation: operation.to_string(),
                host: host.to_string(),
                source,
            },
        }
    }

    pub(crate) fn from_reply(operation: &str, host: &str, err: ReplyError) -> Self {
        match err {
            ReplyError::Stream(source) => Self::from_stream(operation, host, source),
            ReplyError::Malformed(line) => Self::BadResponse {
                operation: operation.to_string(),
                host: host.to_string(),
                line,
            },
        }
    }
}

/// Text Format Control used in `TYPE` command
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum FormatControl {
    /// Default text format control (is NonPrint)
    Default,
    /// Non-print (not destined for printing)
    NonPrint,
    /// Telnet format control (\<CR\>, \<FF\>, etc.)
    Telnet,
    /// ASA (Fortran) Carriage Control
    Asa,
}

/// File Type used in `TYPE` command
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum FileType {
    /// ASCII text (the argument is the text format control)
    Ascii(FormatControl),
    /// EBCDIC text (the argument is the text format control)
    Ebcdic(FormatControl),
    /// Image,
    Image,
    /// Binary (the synonym to Image)
    Binary,
    /// Local format (the argument is the number of bits in one byte on local machine)
    Local(u8),
}

/// How the data channel is established
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// We listen, and tell the server where with `PORT`
    #[default]
    Active,
    /// The server listens, and tells us where with its `PASV` reply
    Passive,
}

impl fmt::Display for FormatControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatControl::Default | FormatControl::NonPrint => write!(f, "N"),
            FormatControl::Telnet => write!(f, "T"),
            FormatControl::Asa => write!(f, "C"),
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileType::Ascii(fc) => write!(f, "A {fc}"),
            FileType::Ebcdic(fc) => write!(f, "E {fc}"),
            FileType::Image | FileType::Binary => write!(f, "I"),
            FileType::Local(bits) => write!(f, "L {bits}"),
        }
    }
}
