use std::{io, net::SocketAddr};

use thiserror::Error;

use crate::http::{HttpStatus, HttpVersion};
use crate::threads::PoolError;

/// Where in the life of a connection a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The leading bytes matched no supported protocol; no handler exists yet.
    VersionDetection,
    /// The request could not be parsed.
    Parsing,
    /// The response could not be serialized or sent.
    Writing,
    /// Anything else raised while a handler was running.
    Unexpected,
}

#[derive(Debug, Error)]
pub enum WasError {
    #[error("version detection failed: {reason}")]
    VersionDetection { reason: String },

    #[error("request parsing failed: {source}")]
    Parsing {
        #[from]
        source: ParseError,
    },

    #[error("response writing failed: {source}")]
    Writing {
        #[from]
        source: WriteError,
    },

    #[error("{feature} is not supported yet")]
    Unsupported { feature: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    #[error("unexpected failure: {reason}")]
    Unexpected { reason: String },
}

impl WasError {
    pub fn version_detection<S: ToString>(reason: S) -> Self {
        Self::VersionDetection { reason: reason.to_string() }
    }

    pub fn unsupported<S: ToString>(feature: S) -> Self {
        Self::Unsupported { feature: feature.to_string() }
    }

    pub fn unexpected<S: ToString>(reason: S) -> Self {
        Self::Unexpected { reason: reason.to_string() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::VersionDetection { .. } => ErrorKind::VersionDetection,
            Self::Parsing { .. } => ErrorKind::Parsing,
            Self::Writing { .. } => ErrorKind::Writing,
            Self::Unsupported { .. } | Self::Io { .. } | Self::Unexpected { .. } => ErrorKind::Unexpected,
        }
    }

    /// Status of the error response owed to the peer.
    pub fn status(&self) -> HttpStatus {
        match self.kind() {
            ErrorKind::Parsing => HttpStatus::BadRequest,
            _ => HttpStatus::InternalServerError,
        }
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("empty request line")]
    EmptyRequestLine,

    #[error("malformed request line: {line}")]
    MalformedRequestLine { line: String },

    #[error("unsupported http method: {method}")]
    UnsupportedMethod { method: String },

    #[error("unsupported http version: {version}")]
    UnsupportedVersion { version: String },

    #[error("malformed header line: {line}")]
    MalformedHeader { line: String },

    #[error("invalid content-length header: {value}")]
    InvalidContentLength { value: String },

    #[error("line exceeds the limit of {max_size} bytes")]
    LineTooLong { max_size: usize },

    #[error("request head is not valid utf-8")]
    InvalidEncoding,

    #[error("truncated body: expected {expected} bytes, received {received}")]
    TruncatedBody { expected: u64, received: u64 },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn malformed_request_line<S: ToString>(line: S) -> Self {
        Self::MalformedRequestLine { line: line.to_string() }
    }

    pub fn unsupported_method<S: ToString>(method: S) -> Self {
        Self::UnsupportedMethod { method: method.to_string() }
    }

    pub fn malformed_header<S: ToString>(line: S) -> Self {
        Self::MalformedHeader { line: line.to_string() }
    }

    pub fn invalid_content_length<S: ToString>(value: S) -> Self {
        Self::InvalidContentLength { value: value.to_string() }
    }
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("unsupported http version: {version}, only HTTP/1.1 is supported")]
    UnsupportedVersion { version: HttpVersion },

    #[error("headers not committed before body write")]
    NotCommitted,

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

/// Failures of the server lifecycle, outside any single connection.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind { addr: SocketAddr, source: io::Error },

    #[error("worker pool error: {source}")]
    Pool {
        #[from]
        source: PoolError,
    },

    #[error("failed to spawn acceptor thread: {source}")]
    Acceptor { source: io::Error },

    #[error("endpoint already started")]
    AlreadyStarted,
}
