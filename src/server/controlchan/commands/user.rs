//! The RFC 959 User Name (`USER`) command
//
// The argument field is a Telnet string identifying the user.
// The user identification is that which is required by the
// server for access to its file system.  This command will
// normally be the first command transmitted by the user after
// the control connections are made.

use crate::server::{
    controlchan::{
        error::ControlChanError,
        handler::{CommandContext, CommandHandler},
        Reply, ReplyCode,
    },
    session::SessionState,
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct User {
    username: String,
}

impl User {
    pub fn new(username: String) -> Self {
        User { username }
    }
}

#[async_trait]
impl CommandHandler for User {
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        session.state = SessionState::New;
        match args.authenticator.check_user(&self.username).await {
            Ok(()) => {
                session.username = Some(self.username.clone());
                session.state = SessionState::WaitPass;
                Ok(Reply::with_default_message(ReplyCode::NeedPassword))
            }
            Err(err) => {
                slog::warn!(args.logger, "Username rejected"; "username" => self.username.as_str());
                session.username = None;
                let msg = match err.message() {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid username: {}", self.username),
                };
                Ok(Reply::new_with_string(err.code().unwrap_or(ReplyCode::NotLoggedIn), msg))
            }
        }
    }
}
