//! The RFC 959 Store (`STOR`) command
//
// This command causes the server-DTP to accept the data
// transferred via the data connection and to store the data as
// a file at the server site.  If the file specified in the
// pathname exists at the server site, then its contents shall
// be replaced by the data being transferred.  A new file is
// created at the server site if the file specified in the
// pathname does not already exist.

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
pub struct Stor {
    path: String,
}

impl Stor {
    pub fn new(path: String) -> Self {
        Stor { path }
    }
}

#[async_trait]
impl CommandHandler for Stor {
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let meta = args.session.lock().await.event_meta();
        args.observer.stor(&meta, &self.path).await;
        Ok(start_transfer(&args, TransferKind::Stor, self.path.clone()).await)
    }
}
