//! The RFC 959 List (`LIST`) command
//
// This command causes a list to be sent from the server to the
// passive DTP.  If the pathname specifies a directory or other
// group of files, the server should transfer a list of files
// in the specified directory.  If the pathname specifies a
// file then the server should send current information on the
// file.  A null argument implies the user's current working or
// default directory.

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
pub struct List {
    path: Option<String>,
}

impl List {
    pub fn new(path: Option<String>) -> Self {
        List { path }
    }
}

#[async_trait]
impl CommandHandler for List {
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let path = match &self.path {
            Some(path) => path.clone(),
            None => args.session.lock().await.fs.pwd(),
        };
        Ok(start_transfer(&args, TransferKind::List, path).await)
    }
}
