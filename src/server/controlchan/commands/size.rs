//! The RFC 3659 File Size (`SIZE`) command
//
// The FTP command, SIZE OF FILE (SIZE), is used to obtain the transfer
// size of a file from the server-FTP process.  This is the exact number
// of octets (8 bit bytes) that would be transmitted over the data
// connection should that file be transmitted.

use crate::server::controlchan::{
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
    Reply, ReplyCode,
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Size {
    file: String,
}

impl Size {
    pub fn new(file: String) -> Self {
        Size { file }
    }
}

#[async_trait]
impl CommandHandler for Size {
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let fs = args.session.lock().await.fs.clone();
        match fs.size(&self.file).await {
            Ok(size) => Ok(Reply::new_with_string(ReplyCode::FileStatus, size.to_string())),
            Err(err) => {
                slog::debug!(args.logger, "Could not get size"; "file" => self.file.as_str(), "error" => %err);
                Ok(Reply::new(ReplyCode::TransientFileError, "Failed to get size of file"))
            }
        }
    }
}
