//! The RFC 959 Make Directory (`MKD`) command
//
// This command causes the directory specified in the pathname
// to be created as a directory (if the pathname is absolute)
// or as a subdirectory of the current working directory (if
// the pathname is relative).

use crate::server::controlchan::{
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
    Reply, ReplyCode,
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Mkd {
    path: String,
}

impl Mkd {
    pub fn new(path: String) -> Self {
        Mkd { path }
    }
}

#[async_trait]
impl CommandHandler for Mkd {
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let fs = args.session.lock().await.fs.clone();
        match fs.mkdir(&self.path).await {
            Ok(()) => Ok(Reply::new(ReplyCode::FileActionOkay, "Directory created")),
            Err(err) => {
                slog::warn!(args.logger, "Failed to create directory"; "path" => self.path.as_str(), "error" => %err);
                Ok(Reply::new_with_string(err.reply_code(), err.message()))
            }
        }
    }
}
