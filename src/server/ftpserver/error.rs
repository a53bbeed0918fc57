//! Contains the error type used by `Server`

use crate::BoxError;

use derive_more::Display;
use std::net::{AddrParseError, SocketAddr};
use thiserror::Error;

/// Error returned by [`ServerBuilder::build`](crate::ServerBuilder::build) and
/// [`Server::listen`](crate::Server::listen)
#[derive(Error, Debug)]
#[error("server error: {msg}")]
pub struct ServerError {
    kind: ServerErrorKind,
    msg: String,
    #[source]
    source: Option<BoxError>,
}

/// What went wrong with the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ServerErrorKind {
    /// The root directory does not exist or is not a directory.
    #[display("invalid root directory")]
    InvalidRoot,
    /// The listen address could not be parsed.
    #[display("invalid address")]
    InvalidAddress,
    /// The listen address stayed in use for all bind attempts.
    #[display("address in use")]
    BindRetriesExhausted,
    /// Binding or accepting failed for another reason.
    #[display("io error")]
    Io,
}

impl ServerError {
    pub(crate) fn new<E>(kind: ServerErrorKind, msg: impl Into<String>, source: E) -> ServerError
    where
        E: Into<BoxError>,
    {
        ServerError {
            kind,
            msg: msg.into(),
            source: Some(source.into()),
        }
    }

    pub(crate) fn bind(addr: SocketAddr, attempts: u32, source: std::io::Error) -> ServerError {
        let kind = if source.kind() == std::io::ErrorKind::AddrInUse {
            ServerErrorKind::BindRetriesExhausted
        } else {
            ServerErrorKind::Io
        };
        ServerError::new(kind, format!("could not bind {} after {} attempt(s)", addr, attempts), source)
    }

    /// Tells the reasons for failure apart.
    pub fn kind(&self) -> ServerErrorKind {
        self.kind
    }
}

impl From<AddrParseError> for ServerError {
    fn from(e: AddrParseError) -> Self {
        ServerError::new(ServerErrorKind::InvalidAddress, "could not parse address", e)
    }
}

impl From<std::io::Error> for ServerError {
    fn from(e: std::io::Error) -> Self {
        ServerError::new(ServerErrorKind::Io, "io error", e)
    }
}
