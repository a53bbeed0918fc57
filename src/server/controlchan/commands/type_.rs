//! The RFC 959 Representation Type (`TYPE`) command
//
// The argument specifies the representation type as described
// in the Section on Data Representation and Storage.  Several
// types take a second parameter.
//
// Only ASCII (`A`) and Image (`I`) are accepted. The type is recorded but bytes are transferred
// unchanged either way.

use crate::server::{
    controlchan::{
        error::ControlChanError,
        handler::{CommandContext, CommandHandler},
        Reply, ReplyCode,
    },
    session::TransferType,
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Type {
    param: String,
}

impl Type {
    pub fn new(param: String) -> Self {
        Type { param }
    }
}

#[async_trait]
impl CommandHandler for Type {
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let transfer_type = match self.param.trim() {
            "A" | "a" => TransferType::Ascii,
            "I" | "i" => TransferType::Binary,
            _ => return Ok(Reply::with_default_message(ReplyCode::ParameterSyntaxError)),
        };
        args.session.lock().await.transfer_type = transfer_type;
        Ok(Reply::new_with_string(ReplyCode::CommandOkay, format!("Type set to {}", transfer_type)))
    }
}
