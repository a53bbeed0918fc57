//! Contains the `ControlChanError` struct that that defines the control channel error type.

use crate::BoxError;

use derive_more::Display;
use thiserror::Error;

/// The error type returned by the control loop and the command handlers.
#[derive(Debug, Error)]
#[error("control channel error: {kind}")]
pub struct ControlChanError {
    kind: ControlChanErrorKind,
    #[source]
    source: Option<BoxError>,
}

/// A list specifying categories of FTP errors. It is meant to be used with the [ControlChanError] type.
#[derive(Eq, PartialEq, Debug, Display, Clone, Copy)]
pub enum ControlChanErrorKind {
    /// We encountered a system IO error.
    #[display("Failed to perform IO")]
    IoError,
    /// Internal Server Error. This is probably a bug, i.e. when a task we talk to over a channel
    /// has gone away.
    #[display("Internal Server Error")]
    InternalServerError,
}

impl ControlChanError {
    /// Creates a new FTP Error with the specific kind
    pub fn new(kind: ControlChanErrorKind) -> Self {
        ControlChanError { kind, source: None }
    }

    /// Return the inner error kind of this error.
    pub fn kind(&self) -> ControlChanErrorKind {
        self.kind
    }
}

impl From<ControlChanErrorKind> for ControlChanError {
    fn from(kind: ControlChanErrorKind) -> ControlChanError {
        ControlChanError::new(kind)
    }
}

impl From<std::io::Error> for ControlChanError {
    fn from(err: std::io::Error) -> ControlChanError {
        ControlChanError {
            kind: ControlChanErrorKind::IoError,
            source: Some(Box::new(err)),
        }
    }
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for ControlChanError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> ControlChanError {
        ControlChanError::new(ControlChanErrorKind::InternalServerError)
    }
}
