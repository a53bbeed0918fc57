use crate::{BoxError, server::ReplyCode};
use derive_more::Display;
use thiserror::Error;

/// The error returned by the [`Filesystem`](crate::storage::Filesystem). Every error carries the
/// FTP reply code and message the control channel sends back to the client.
#[derive(Debug, Error)]
#[error("storage error: {kind}")]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    #[source]
    source: Option<BoxError>,
}

impl Error {
    /// Creates a new storage error wrapping the error that caused it.
    pub fn new<E>(kind: ErrorKind, error: E) -> Error
    where
        E: Into<BoxError>,
    {
        Error {
            kind,
            message: None,
            source: Some(error.into()),
        }
    }

    /// Creates a storage error with a message that overrides the kind's default text.
    pub fn with_message(kind: ErrorKind, message: impl Into<String>) -> Error {
        Error {
            kind,
            message: Some(message.into()),
            source: None,
        }
    }

    /// Detailed information about what the FTP server should do with the failure
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The numeric FTP status code sent to the client.
    pub fn code(&self) -> u32 {
        self.kind.reply_code() as u32
    }

    /// The reply code sent to the client.
    pub fn reply_code(&self) -> ReplyCode {
        self.kind.reply_code()
    }

    /// The human readable part of the reply.
    pub fn message(&self) -> String {
        match &self.message {
            Some(message) => message.clone(),
            None => self.kind.default_message().to_string(),
        }
    }

    /// Attempts to get a reference to the inner `std::io::Error` if there is one.
    pub fn get_io_error(&self) -> Option<&std::io::Error> {
        self.source.as_ref()?.downcast_ref::<std::io::Error>()
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            kind,
            message: None,
            source: None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        let kind = match err.kind() {
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
            _ => ErrorKind::PermanentFileNotAvailable,
        };
        Error {
            kind,
            message: Some(err.to_string()),
            source: Some(Box::new(err)),
        }
    }
}

/// The categories of filesystem failures and the reply code each one maps to.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Display)]
pub enum ErrorKind {
    /// The directory a command refers to does not exist.
    #[display("431 No such directory")]
    NoSuchDirectory,
    /// The file a command refers to does not exist or is not a regular file.
    #[display("431 No such file")]
    NoSuchFile,
    /// The operation is deliberately not supported, e.g. renaming.
    #[display("431 Not implemented")]
    NotImplemented,
    /// 450 Requested file action not taken. File unavailable (e.g., file busy).
    #[display("450 Transient file not available")]
    TransientFileNotAvailable,
    /// 451 Requested action aborted: local error in processing.
    #[display("451 Local error")]
    LocalError,
    /// 550 Requested action not taken. File unavailable (e.g., file not found, no access).
    ///
    /// This is the kind used when nothing more specific applies.
    #[display("550 Permanent file not available")]
    PermanentFileNotAvailable,
    /// The path points outside the root or the operating system refused access.
    #[display("550 Permission denied")]
    PermissionDenied,
}

impl ErrorKind {
    /// The reply code this kind of error produces.
    pub fn reply_code(self) -> ReplyCode {
        match self {
            ErrorKind::NoSuchDirectory | ErrorKind::NoSuchFile | ErrorKind::NotImplemented => ReplyCode::NoSuchFileOrDirectory,
            ErrorKind::TransientFileNotAvailable => ReplyCode::TransientFileError,
            ErrorKind::LocalError => ReplyCode::LocalError,
            ErrorKind::PermanentFileNotAvailable | ErrorKind::PermissionDenied => ReplyCode::FileError,
        }
    }

    fn default_message(self) -> &'static str {
        match self {
            ErrorKind::NoSuchDirectory => "No such directory",
            ErrorKind::NoSuchFile => "No such file",
            ErrorKind::NotImplemented => "Not implemented",
            ErrorKind::TransientFileNotAvailable => "File not available",
            ErrorKind::LocalError => "Local error",
            ErrorKind::PermanentFileNotAvailable => "File not available",
            ErrorKind::PermissionDenied => "Permission denied",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn kinds_map_to_reply_codes() {
        assert_eq!(Error::from(ErrorKind::NoSuchDirectory).code(), 431);
        assert_eq!(Error::from(ErrorKind::LocalError).code(), 451);
        assert_eq!(Error::from(ErrorKind::PermissionDenied).code(), 550);
    }

    #[test]
    fn io_errors_default_to_550() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.code(), 550);
        assert_eq!(err.message(), "gone");
        assert!(err.get_io_error().is_some());
    }

    #[test]
    fn explicit_message_wins() {
        let err = Error::with_message(ErrorKind::NotImplemented, "rename not implemented yet");
        assert_eq!(err.code(), 431);
        assert_eq!(err.message(), "rename not implemented yet");
    }
}
