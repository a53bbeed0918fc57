//! Contains code common to the commands that move bytes over the data connection.

use crate::server::{
    chancomms::{DataCommand, TransferKind},
    controlchan::{handler::CommandContext, Reply, ReplyCode},
};

// Hands the transfer to the data channel. Its replies (150 and then 226 or an error) are sent
// from there once a data connection is paired with it.
pub(super) async fn start_transfer(args: &CommandContext, kind: TransferKind, path: String) -> Reply {
    let (data, cmd) = {
        let session = args.session.lock().await;
        slog::debug!(args.logger, "Requesting transfer"; "cmd" => %kind, "path" => path.as_str(), "type" => %session.transfer_type);
        let cmd = DataCommand {
            kind,
            path,
            fs: session.fs.clone(),
            events: session.event_source(),
        };
        (session.data.clone(), cmd)
    };
    match data.transfer(cmd).await {
        Ok(()) => Reply::none(),
        Err(err) => {
            slog::warn!(args.logger, "Refusing transfer"; "error" => %err);
            Reply::with_default_message(ReplyCode::CantOpenDataConnection)
        }
    }
}
