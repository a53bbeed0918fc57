//! This module provides an anonymous authenticator

use crate::auth::*;
use async_trait::async_trait;

///
/// [`Authenticator`](crate::auth::Authenticator) implementation that lets in anyone giving a
/// non-empty username and password.
///
/// # Example
///
/// ```rust
/// # #[tokio::main]
/// # async fn main() {
/// use libftpd::auth::{Authenticator, AnonymousAuthenticator};
///
/// let my_auth = AnonymousAuthenticator;
/// assert!(my_auth.check_user("Finn").await.is_ok());
/// assert!(my_auth.check_password("Finn", "").await.is_err());
/// # }
/// ```
///
#[derive(Debug)]
pub struct AnonymousAuthenticator;

#[async_trait]
impl Authenticator for AnonymousAuthenticator {
    #[tracing_attributes::instrument]
    async fn check_user(&self, username: &str) -> Result<(), AuthenticationError> {
        if username.is_empty() { Err(AuthenticationError::default()) } else { Ok(()) }
    }

    #[tracing_attributes::instrument(skip(password))]
    async fn check_password(&self, _username: &str, password: &str) -> Result<(), AuthenticationError> {
        if password.is_empty() { Err(AuthenticationError::default()) } else { Ok(()) }
    }
}
