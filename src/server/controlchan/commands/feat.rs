//! The RFC 2389 Feature (`FEAT`) command

use crate::server::controlchan::{
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
    Reply, ReplyCode,
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Feat;

#[async_trait]
impl CommandHandler for Feat {
    #[tracing_attributes::instrument]
    async fn handle(&self, _args: CommandContext) -> Result<Reply, ControlChanError> {
        // Each feature line must be indented by a space.
        Ok(Reply::new_multiline(ReplyCode::SystemStatus, ["Extensions supported", " SIZE", "End"]))
    }
}
