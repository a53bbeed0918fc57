/// A reply to the FTP client
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Reply {
    None,
    CodeAndMsg { code: ReplyCode, msg: String },
    MultiLine { code: ReplyCode, lines: Vec<String> },
}

/// The reply codes according to RFC 959.
//
// From: https://cr.yp.to/ftp/request.html#response
//
// The three digits form a code. Codes between 100 and 199 indicate marks; codes between 200
// and 399 indicate acceptance; codes between 400 and 599 indicate rejection.
//
// The server can reject any request with code
// - 421 if the server is about to close the connection;
// - 500, 501, 502, or 504 for unacceptable syntax; or
// - 530 if permission is denied.
//
// 431 is not in RFC 959. It is used here for "no such file or directory".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ReplyCode {
    /// 150 File status okay; about to open data connection.
    FileStatusOkay = 150,

    /// 200 Command okay.
    CommandOkay = 200,
    /// 202 Command not implemented, superfluous at this site.
    CommandOkayNotImplemented = 202,
    /// 211 System status, or system help reply.
    SystemStatus = 211,
    /// 213 File status.
    FileStatus = 213,
    /// 215 NAME system type.
    SystemType = 215,
    /// 220 Service ready for new user.
    ServiceReady = 220,
    /// 221 Service closing control connection.
    ClosingControlConnection = 221,
    /// 226 Closing data connection.
    ClosingDataConnection = 226,
    /// 227 Entering Passive Mode.
    EnteringPassiveMode = 227,
    /// 230 User logged in, proceed.
    UserLoggedIn = 230,
    /// 250 Requested file action okay, completed.
    FileActionOkay = 250,
    /// 257 "PATHNAME" created.
    DirCreated = 257,

    /// 331 User name okay, need password.
    NeedPassword = 331,
    /// 350 Requested file action pending further information.
    FileActionPending = 350,

    /// 421 Service not available, closing control connection.
    ServiceNotAvailable = 421,
    /// 425 Can't open data connection.
    CantOpenDataConnection = 425,
    /// 426 Connection closed; transfer aborted.
    ConnectionClosed = 426,
    /// 431 No such file or directory.
    NoSuchFileOrDirectory = 431,
    /// 450 Requested file action not taken.
    TransientFileError = 450,
    /// 451 Requested action aborted. Local error in processing.
    LocalError = 451,

    /// 500 Syntax error, command unrecognized.
    CommandSyntaxError = 500,
    /// 501 Syntax error in parameters or arguments.
    ParameterSyntaxError = 501,
    /// 502 Command not implemented.
    CommandNotImplemented = 502,
    /// 503 Bad sequence of commands.
    BadCommandSequence = 503,
    /// 530 Not logged in.
    NotLoggedIn = 530,
    /// 550 Requested action not taken.
    FileError = 550,
}

impl ReplyCode {
    /// The text sent along with this code when a command has nothing more specific to say.
    pub fn default_message(self) -> &'static str {
        match self {
            ReplyCode::FileStatusOkay => "File status okay; about to open data connection.",
            ReplyCode::CommandOkay => "Command okay.",
            ReplyCode::CommandOkayNotImplemented => "Command not implemented, superfluous at this site.",
            ReplyCode::SystemStatus => "System status, or system help reply.",
            ReplyCode::FileStatus => "File status.",
            ReplyCode::SystemType => "NodeFTP server emulator.",
            ReplyCode::ServiceReady => "Service ready for new user.",
            ReplyCode::ClosingControlConnection => "Service closing control connection.",
            ReplyCode::ClosingDataConnection => "Closing data connection.",
            ReplyCode::EnteringPassiveMode => "Entering Passive Mode.",
            ReplyCode::UserLoggedIn => "User logged in, proceed.",
            ReplyCode::FileActionOkay => "Requested file action okay, completed.",
            ReplyCode::DirCreated => "Directory created.",
            ReplyCode::NeedPassword => "User name okay, need password.",
            ReplyCode::FileActionPending => "Requested file action pending further information.",
            ReplyCode::ServiceNotAvailable => "Service not available, closing control connection.",
            ReplyCode::CantOpenDataConnection => "Can't open data connection.",
            ReplyCode::ConnectionClosed => "Connection closed; transfer aborted.",
            ReplyCode::NoSuchFileOrDirectory => "No such file or directory.",
            ReplyCode::TransientFileError => "Requested file action not taken.",
            ReplyCode::LocalError => "Requested action aborted. Local error in processing.",
            ReplyCode::CommandSyntaxError => "Syntax error, command unrecognized.",
            ReplyCode::ParameterSyntaxError => "Syntax error in parameters or arguments.",
            ReplyCode::CommandNotImplemented => "Command not implemented.",
            ReplyCode::BadCommandSequence => "Bad sequence of commands.",
            ReplyCode::NotLoggedIn => "Not logged in.",
            ReplyCode::FileError => "Requested action not taken.",
        }
    }
}

impl Reply {
    pub fn new(code: ReplyCode, message: &str) -> Self {
        Reply::CodeAndMsg {
            code,
            msg: message.to_string(),
        }
    }

    pub fn new_with_string(code: ReplyCode, msg: String) -> Self {
        Reply::CodeAndMsg { code, msg }
    }

    // A reply carrying the standard text of its code
    pub fn with_default_message(code: ReplyCode) -> Self {
        Reply::new(code, code.default_message())
    }

    pub fn new_multiline<I>(code: ReplyCode, lines: I) -> Self
    where
        I: IntoIterator,
        I::Item: std::fmt::Display,
    {
        Reply::MultiLine {
            code,
            lines: lines.into_iter().map(|item| format!("{}", item)).collect(),
        }
    }

    // A no-reply
    pub fn none() -> Self {
        Reply::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_messages_follow_the_code() {
        assert_eq!(
            Reply::with_default_message(ReplyCode::NotLoggedIn),
            Reply::CodeAndMsg {
                code: ReplyCode::NotLoggedIn,
                msg: "Not logged in.".to_string()
            }
        );
        assert_eq!(ReplyCode::SystemType.default_message(), "NodeFTP server emulator.");
    }

    #[test]
    fn codes_are_numeric() {
        assert_eq!(ReplyCode::NoSuchFileOrDirectory as u32, 431);
        assert_eq!(ReplyCode::EnteringPassiveMode as u32, 227);
    }
}
