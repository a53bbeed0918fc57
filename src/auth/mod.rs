//! Contains the [`Authenticator`] trait that decides who may log in.
//!
//! The server asks the authenticator twice per login: once when the client sends `USER` and once
//! when it sends `PASS`. Implement the trait to plug in your own policy:
//!
//! ```no_run
//! use libftpd::auth::{Authenticator, AuthenticationError};
//! use async_trait::async_trait;
//!
//! #[derive(Debug)]
//! struct OnlyAlice;
//!
//! #[async_trait]
//! impl Authenticator for OnlyAlice {
//!     async fn check_user(&self, username: &str) -> Result<(), AuthenticationError> {
//!         if username == "alice" { Ok(()) } else { Err(AuthenticationError::default()) }
//!     }
//!
//!     async fn check_password(&self, _username: &str, password: &str) -> Result<(), AuthenticationError> {
//!         if password == "wonderland" { Ok(()) } else { Err(AuthenticationError::with_message("Go away")) }
//!     }
//! }
//! ```

mod anonymous;
pub use anonymous::AnonymousAuthenticator;

mod authenticator;
pub use authenticator::{AuthenticationError, Authenticator};
