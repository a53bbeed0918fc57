//! libftpd is an asynchronous FTP server library that serves a single directory tree.
//!
//! Every session is jailed inside the server root. Uploads are watched so that a client that stops
//! sending without closing its data connection still gets a completion reply once the file stops
//! growing.
//!
//! Run a server on port 2121 that serves the system's temporary directory:
//!
//! ```no_run
//! use libftpd::ServerBuilder;
//!
//! #[tokio::main]
//! pub async fn main() {
//!     let server = ServerBuilder::new(std::env::temp_dir())
//!         .greeting("Welcome to my FTP server")
//!         .build()
//!         .unwrap();
//!
//!     server.listen("127.0.0.1:2121").await.unwrap();
//! }
//! ```
//!
//! Logins are decided by an [`auth::Authenticator`] and what clients do can be followed with a
//! [`notification::SessionObserver`].

pub mod auth;
pub mod notification;
pub(crate) mod server;
pub mod storage;
pub mod watchdog;

pub use crate::server::{ReplyCode, Server, ServerBuilder, ServerError, ServerErrorKind, options};

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
