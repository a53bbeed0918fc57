//! The RFC 959 Delete (`DELE`) command
//
// This command causes the file specified in the pathname to be
// deleted at the server site.

use crate::server::controlchan::{
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
    Reply, ReplyCode,
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Dele {
    path: String,
}

impl Dele {
    pub fn new(path: String) -> Self {
        Dele { path }
    }
}

#[async_trait]
impl CommandHandler for Dele {
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let fs = args.session.lock().await.fs.clone();
        match fs.unlink(&self.path).await {
            Ok(()) => Ok(Reply::new(ReplyCode::FileActionOkay, "File deleted")),
            Err(err) => {
                slog::warn!(args.logger, "Failed to delete file"; "path" => self.path.as_str(), "error" => %err);
                Ok(Reply::new_with_string(err.reply_code(), err.message()))
            }
        }
    }
}
