//! The RFC 959 Logout (`QUIT`) command.
//
// This command terminates a USER and if file transfer is not
// in progress, the server closes the control connection.  If
// file transfer is in progress, the connection will remain
// open for result response and the server will then close it.

use crate::server::{
    chancomms::ControlChanMsg,
    controlchan::{
        error::ControlChanError,
        handler::{CommandContext, CommandHandler},
        Reply, ReplyCode,
    },
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Quit;

#[async_trait]
impl CommandHandler for Quit {
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        // The control loop sends our reply and then picks up the exit message.
        args.tx.send(ControlChanMsg::ExitControlLoop).await?;
        let meta = args.session.lock().await.event_meta();
        args.observer.quit(&meta).await;
        Ok(Reply::with_default_message(ReplyCode::ClosingControlConnection))
    }
}
