//! The RFC 959 Rename To (`RNTO`) command
//
// This command specifies the new pathname of the file
// specified in the immediately preceding "rename from"
// command.  Together the two commands cause a file to be
// renamed.

use crate::server::controlchan::{
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
    Reply, ReplyCode,
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Rnto {
    file: String,
}

impl Rnto {
    pub fn new(file: String) -> Self {
        Rnto { file }
    }
}

#[async_trait]
impl CommandHandler for Rnto {
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        let Some(from) = session.rename_from.take() else {
            return Ok(Reply::with_default_message(ReplyCode::BadCommandSequence));
        };
        match session.fs.rename(&from, &self.file).await {
            Ok(()) => Ok(Reply::new(ReplyCode::FileActionOkay, "File renamed successfully")),
            Err(err) => {
                slog::warn!(args.logger, "Failed to rename"; "from" => from.as_str(), "to" => self.file.as_str(), "error" => %err);
                Ok(Reply::new_with_string(err.reply_code(), err.message()))
            }
        }
    }
}
