use std::fmt;

/// A password as sent with `PASS`. Its `Debug` output hides the secret so commands can be logged.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    pub fn new(password: String) -> Self {
        Password(password)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("*******")
    }
}

/// A command as parsed from a control channel line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    User {
        /// The bytes making up the actual username.
        username: String,
    },
    Pass {
        /// The bytes making up the actual password.
        password: Password,
    },
    Syst,
    Feat,
    /// `PWD` and its alias `XPWD`
    Pwd,
    Cwd {
        /// The path the client would like to change directory to.
        path: String,
    },
    Cdup,
    Type {
        /// `A` or `I`, anything else is refused.
        param: String,
    },
    Pasv,
    Port {
        /// The `h1,h2,h3,h4,p1,p2` address the server should connect to.
        addr: String,
    },
    List {
        /// The path of the file/directory the clients wants to list. Defaults to the working
        /// directory.
        path: Option<String>,
    },
    Retr {
        /// The path to the file the client would like to retrieve.
        path: String,
    },
    Stor {
        /// The path to the file the client would like to store.
        path: String,
    },
    Mkd {
        /// The path to the directory the client wants to create.
        path: String,
    },
    Dele {
        /// The (regular) file to delete.
        path: String,
    },
    Rnfr {
        /// The file to be renamed
        file: String,
    },
    Rnto {
        /// The filename to rename to
        file: String,
    },
    Size {
        file: String,
    },
    Quit,
    /// A known command that is accepted without doing anything (202).
    Stub { command: String },
    /// A known command this server refuses to implement (502).
    NotImplemented { command: String },
}

impl Command {
    /// Whether the command may only be used after logging in.
    pub fn requires_auth(&self) -> bool {
        match self {
            Command::User { .. } | Command::Pass { .. } | Command::Feat | Command::Syst | Command::Quit => false,
            Command::Stub { command } | Command::NotImplemented { command } => !matches!(command.as_str(), "ABOR" | "NOOP" | "STAT"),
            _ => true,
        }
    }
}
