//! The RFC 959 Rename From (`RNFR`) command
//
// This command specifies the old pathname of the file which is
// to be renamed.  This command must be immediately followed by
// a "rename to" command specifying the new file pathname.

use crate::server::controlchan::{
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
    Reply, ReplyCode,
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Rnfr {
    file: String,
}

impl Rnfr {
    pub fn new(file: String) -> Self {
        Rnfr { file }
    }
}

#[async_trait]
impl CommandHandler for Rnfr {
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        if session.fs.exists(&self.file).await {
            session.rename_from = Some(self.file.clone());
            Ok(Reply::new(ReplyCode::FileActionPending, "File exists, ready for destination name"))
        } else {
            // Refused here rather than at RNTO so the client learns about the typo before it
            // sends a destination.
            session.rename_from = None;
            Ok(Reply::new(ReplyCode::FileError, "File does not exist"))
        }
    }
}
