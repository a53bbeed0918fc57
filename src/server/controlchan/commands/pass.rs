//! The RFC 959 Password (`PASS`) command
//
// The argument field is a Telnet string specifying the user's
// password.  This command must be immediately preceded by the
// user name command, and, for some sites, completes the user's
// identification for access control.

use crate::server::{
    controlchan::{
        command::Password,
        error::ControlChanError,
        handler::{CommandContext, CommandHandler},
        Reply, ReplyCode,
    },
    session::SessionState,
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Pass {
    password: Password,
}

impl Pass {
    pub fn new(password: Password) -> Self {
        Pass { password }
    }
}

#[async_trait]
impl CommandHandler for Pass {
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        let Some(username) = session.username.clone() else {
            return Ok(Reply::with_default_message(ReplyCode::BadCommandSequence));
        };
        match args.authenticator.check_password(&username, self.password.as_str()).await {
            Ok(()) => {
                slog::info!(args.logger, "User logged in"; "username" => username.as_str());
                session.state = SessionState::WaitCmd;
                Ok(Reply::with_default_message(ReplyCode::UserLoggedIn))
            }
            Err(err) => {
                session.auth_failures += 1;
                session.username = None;
                session.state = SessionState::New;
                slog::warn!(args.logger, "Password rejected"; "username" => username.as_str(), "failures" => session.auth_failures);
                let msg = err.message().unwrap_or("Invalid password").to_string();
                Ok(Reply::new_with_string(err.code().unwrap_or(ReplyCode::NotLoggedIn), msg))
            }
        }
    }
}
