//! The RFC 959 Change Working Directory (`CWD`) command
//
// This command allows the user to work with a different
// directory or dataset for file storage or retrieval without
// altering his login or accounting information.  Transfer
// parameters are similarly unchanged.  The argument is a
// pathname specifying a directory or other system dependent
// file group designator.

use crate::server::controlchan::{
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
    Reply, ReplyCode,
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Cwd {
    path: String,
}

impl Cwd {
    pub fn new(path: String) -> Self {
        Cwd { path }
    }
}

#[async_trait]
impl CommandHandler for Cwd {
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        match session.fs.chdir(&self.path).await {
            Ok(cwd) => {
                let meta = session.event_meta();
                drop(session);
                args.observer.cwd_changed(&meta, &cwd).await;
                Ok(Reply::new_with_string(ReplyCode::FileActionOkay, format!("Directory changed to \"{}\"", cwd)))
            }
            Err(err) => {
                slog::warn!(args.logger, "Failed to change directory"; "path" => self.path.as_str(), "error" => %err);
                Ok(Reply::new_with_string(err.reply_code(), err.message()))
            }
        }
    }
}
