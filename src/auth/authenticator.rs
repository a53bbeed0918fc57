//! The service provider interface (SPI) for auth

use crate::server::ReplyCode;
use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

/// Defines the requirements for Authentication implementations
#[async_trait]
pub trait Authenticator: Sync + Send + Debug {
    /// Decides whether `username` may continue with a password.
    async fn check_user(&self, username: &str) -> Result<(), AuthenticationError>;

    /// Decides whether `password` logs `username` in.
    async fn check_password(&self, username: &str, password: &str) -> Result<(), AuthenticationError>;
}

/// A rejection by the [`Authenticator`]. The reply code and message go to the client as is; when
/// left out, 530 and a command specific message are used.
#[derive(Debug, Default, Clone, Error, PartialEq, Eq)]
#[error("authentication failed")]
pub struct AuthenticationError {
    code: Option<ReplyCode>,
    message: Option<String>,
}

impl AuthenticationError {
    /// Rejects with the given reply code.
    pub fn with_code(code: ReplyCode) -> Self {
        AuthenticationError {
            code: Some(code),
            message: None,
        }
    }

    /// Rejects with the given reply message.
    pub fn with_message(message: impl Into<String>) -> Self {
        AuthenticationError {
            code: None,
            message: Some(message.into()),
        }
    }

    /// The reply code to send, if the authenticator chose one.
    pub fn code(&self) -> Option<ReplyCode> {
        self.code
    }

    /// The reply message to send, if the authenticator chose one.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}
