use crate::{
    auth::Authenticator,
    notification::SessionObserver,
    server::{
        chancomms::ControlChanMsg,
        controlchan::{error::ControlChanError, Reply},
        ftpserver::options::PassiveHost,
        session::SharedSession,
    },
};
use async_trait::async_trait;
use std::{net::SocketAddr, result::Result, sync::Arc};
use tokio::sync::mpsc::Sender;

#[async_trait]
pub(crate) trait CommandHandler: Send + Sync + std::fmt::Debug {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError>;
}

/// Convenience struct to group command args
#[derive(Debug)]
pub(crate) struct CommandContext {
    pub session: SharedSession,
    pub authenticator: Arc<dyn Authenticator>,
    pub observer: Arc<dyn SessionObserver>,
    pub passive_mode: bool,
    pub passive_host: PassiveHost,
    pub tx: Sender<ControlChanMsg>,
    pub local_addr: SocketAddr,
    pub logger: slog::Logger,
}
