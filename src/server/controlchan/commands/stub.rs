//! Commands that are recognized but not acted upon.
//
// Stubs reply 202 (superfluous at this site). A few commands are refused with 502 instead.

use crate::server::controlchan::{
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
    Reply, ReplyCode,
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Stub {
    command: String,
}

impl Stub {
    pub fn new(command: String) -> Self {
        Stub { command }
    }
}

#[async_trait]
impl CommandHandler for Stub {
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        slog::debug!(args.logger, "Ignoring command"; "cmd" => self.command.as_str());
        Ok(Reply::with_default_message(ReplyCode::CommandOkayNotImplemented))
    }
}

#[derive(Debug)]
pub struct NotImplemented {
    command: String,
}

impl NotImplemented {
    pub fn new(command: String) -> Self {
        NotImplemented { command }
    }
}

#[async_trait]
impl CommandHandler for NotImplemented {
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        slog::debug!(args.logger, "Refusing command"; "cmd" => self.command.as_str());
        Ok(Reply::with_default_message(ReplyCode::CommandNotImplemented))
    }
}
