//! The RFC 959 Retrieve (`RETR`) command
//
// This command causes the server-DTP to transfer a copy of the
// file, specified in the pathname, to the server- or user-DTP
// at the other end of the data connection.  The status and
// contents of the file at the server site shall be unaffected.

use super::transfer_common::start_transfer;
use crate::server::{
    chancomms::TransferKind,
    controlchan::{
        error::ControlChanError,
        handler::{CommandContext, CommandHandler},
        Reply,
    },
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Retr {
    path: String,
}

impl Retr {
    pub fn new(path: String) -> Self {
        Retr { path }
    }
}

#[async_trait]
impl CommandHandler for Retr {
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let meta = args.session.lock().await.event_meta();
        args.observer.retr(&meta, &self.path).await;
        Ok(start_transfer(&args, TransferKind::Retr, self.path.clone()).await)
    }
}
