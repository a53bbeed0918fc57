use crate::{
    auth::Authenticator,
    notification::SessionObserver,
    server::{
        chancomms::ControlChanMsg,
        controlchan::{
            codecs::FtpCodec,
            command::Command,
            commands,
            error::ControlChanError,
            handler::{CommandContext, CommandHandler},
            line_parser,
            Reply, ReplyCode,
        },
        datachan::{DataConfig, DataConnections},
        ftpserver::options::PassiveHost,
        session::{Session, SessionId, SharedSession},
    },
    storage::Filesystem,
    watchdog::WatchdogConfig,
};

use futures_util::{SinkExt, StreamExt};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tokio::{
    net::TcpStream,
    sync::{mpsc, Mutex},
};
use tokio_util::codec::Decoder;

// What every control loop gets from the server.
#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub root: PathBuf,
    pub greeting: String,
    pub authenticator: Arc<dyn Authenticator>,
    pub observer: Arc<dyn SessionObserver>,
    pub passive_mode: bool,
    pub passive_host: PassiveHost,
    pub autocreate_directories: bool,
    pub watchdog: WatchdogConfig,
    pub data_connection_grace: Duration,
    pub logger: slog::Logger,
}

// Things the control loop reacts to.
#[derive(Debug)]
enum Event {
    Command(line_parser::Result<Command>),
    InternalMsg(ControlChanMsg),
}

/// Greets the client and spawns the loop that handles its commands.
#[tracing_attributes::instrument(skip(config))]
pub(crate) async fn spawn(config: Config, tcp_stream: TcpStream) -> Result<(), ControlChanError> {
    let Config {
        root,
        greeting,
        authenticator,
        observer,
        passive_mode,
        passive_host,
        autocreate_directories,
        watchdog,
        data_connection_grace,
        logger,
    } = config;

    let local_addr = tcp_stream.local_addr()?;
    let peer_addr = tcp_stream.peer_addr()?;
    let trace_id = SessionId::new();
    let logger = logger.new(slog::o!("trace-id" => trace_id.to_string(), "peer" => peer_addr.to_string()));

    let (control_msg_tx, mut control_msg_rx) = mpsc::channel::<ControlChanMsg>(8);
    let data = DataConnections::new(DataConfig {
        tx: control_msg_tx.clone(),
        observer: observer.clone(),
        watchdog,
        grace: data_connection_grace,
        logger: logger.clone(),
    });
    let fs = Filesystem::new(root).autocreate_directories(autocreate_directories);
    let session = Session::new(trace_id, fs, data.clone());
    let meta = session.event_meta();
    let shared_session: SharedSession = Arc::new(Mutex::new(session));

    let mut framed = FtpCodec::new().framed(tcp_stream);
    framed.send(Reply::new_with_string(ReplyCode::ServiceReady, greeting)).await?;
    observer.connected(&meta, peer_addr).await;
    let (mut reply_sink, mut command_source) = framed.split();

    tokio::spawn(async move {
        // The control channel event loop
        slog::info!(logger, "Starting control loop");
        loop {
            let event = tokio::select! {
                biased;
                Some(msg) = control_msg_rx.recv() => Event::InternalMsg(msg),
                next = command_source.next() => match next {
                    Some(Ok(parsed)) => Event::Command(parsed),
                    Some(Err(err)) => {
                        slog::warn!(logger, "Control connection read error"; "error" => %err);
                        break;
                    }
                    None => {
                        slog::info!(logger, "Client closed the control connection");
                        break;
                    }
                },
            };

            let (reply, close_connection) = match event {
                Event::InternalMsg(msg) => handle_internal_msg(&logger, msg),
                Event::Command(Err(err)) => {
                    slog::warn!(logger, "Could not parse command"; "error" => %err.kind());
                    (Reply::with_default_message(ReplyCode::CommandNotImplemented), false)
                }
                Event::Command(Ok(cmd)) => {
                    let args = CommandContext {
                        session: shared_session.clone(),
                        authenticator: authenticator.clone(),
                        observer: observer.clone(),
                        passive_mode,
                        passive_host,
                        tx: control_msg_tx.clone(),
                        local_addr,
                        logger: logger.clone(),
                    };
                    match handle_command(cmd, args).await {
                        Ok(reply) => (reply, false),
                        Err(err) => {
                            slog::error!(logger, "Command handler failed"; "error" => %err, "kind" => %err.kind());
                            (Reply::with_default_message(ReplyCode::LocalError), false)
                        }
                    }
                }
            };

            if let Err(err) = reply_sink.send(reply).await {
                slog::warn!(logger, "Could not send reply to client"; "error" => %err);
                break;
            }
            if close_connection {
                break;
            }
        }
        data.close().await;
        slog::info!(logger, "Control loop ended");
    });

    Ok(())
}

#[tracing_attributes::instrument(skip(args))]
async fn handle_command(cmd: Command, args: CommandContext) -> Result<Reply, ControlChanError> {
    slog::debug!(args.logger, "Processing command"; "cmd" => ?cmd);
    {
        let mut session = args.session.lock().await;
        if cmd.requires_auth() && !session.authenticated() {
            return Ok(Reply::with_default_message(ReplyCode::NotLoggedIn));
        }
        // A pending rename only survives until the next command.
        if !matches!(cmd, Command::Rnfr { .. } | Command::Rnto { .. }) {
            session.rename_from = None;
        }
    }

    let handler: Box<dyn CommandHandler> = match cmd {
        Command::User { username } => Box::new(commands::User::new(username)),
        Command::Pass { password } => Box::new(commands::Pass::new(password)),
        Command::Syst => Box::new(commands::Syst),
        Command::Feat => Box::new(commands::Feat),
        Command::Pwd => Box::new(commands::Pwd),
        Command::Cwd { path } => Box::new(commands::Cwd::new(path)),
        Command::Cdup => Box::new(commands::Cdup),
        Command::Type { param } => Box::new(commands::Type::new(param)),
        Command::Pasv => Box::new(commands::Pasv),
        Command::Port { addr } => Box::new(commands::Port::new(addr)),
        Command::List { path } => Box::new(commands::List::new(path)),
        Command::Retr { path } => Box::new(commands::Retr::new(path)),
        Command::Stor { path } => Box::new(commands::Stor::new(path)),
        Command::Mkd { path } => Box::new(commands::Mkd::new(path)),
        Command::Dele { path } => Box::new(commands::Dele::new(path)),
        Command::Rnfr { file } => Box::new(commands::Rnfr::new(file)),
        Command::Rnto { file } => Box::new(commands::Rnto::new(file)),
        Command::Size { file } => Box::new(commands::Size::new(file)),
        Command::Quit => Box::new(commands::Quit),
        Command::Stub { command } => Box::new(commands::Stub::new(command)),
        Command::NotImplemented { command } => Box::new(commands::NotImplemented::new(command)),
    };

    handler.handle(args).await
}

// Maps a message from the data channel to the reply for the client and whether the control
// connection should be closed after sending it.
fn handle_internal_msg(logger: &slog::Logger, msg: ControlChanMsg) -> (Reply, bool) {
    slog::debug!(logger, "Internal message"; "msg" => %msg);
    match msg {
        ControlChanMsg::DataConnectionOpen => (Reply::with_default_message(ReplyCode::FileStatusOkay), false),
        ControlChanMsg::TransferComplete => (Reply::with_default_message(ReplyCode::ClosingDataConnection), false),
        ControlChanMsg::StorageError(err) => (Reply::new_with_string(err.reply_code(), err.message()), false),
        ControlChanMsg::ConnectionReset => (Reply::with_default_message(ReplyCode::ConnectionClosed), false),
        ControlChanMsg::DataConnectionFailed => (Reply::with_default_message(ReplyCode::CantOpenDataConnection), false),
        ControlChanMsg::UnpairedDataConnection => (Reply::with_default_message(ReplyCode::ServiceNotAvailable), true),
        ControlChanMsg::ExitControlLoop => (Reply::none(), true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{self, ErrorKind};
    use pretty_assertions::assert_eq;

    fn logger() -> slog::Logger {
        slog::Logger::root(slog::Discard, slog::o!())
    }

    #[test]
    fn transfer_messages_become_replies() {
        let (reply, close) = handle_internal_msg(&logger(), ControlChanMsg::TransferComplete);
        assert_eq!(reply, Reply::new(ReplyCode::ClosingDataConnection, "Closing data connection."));
        assert!(!close);

        let (reply, close) = handle_internal_msg(&logger(), ControlChanMsg::ConnectionReset);
        assert_eq!(reply, Reply::new(ReplyCode::ConnectionClosed, "Connection closed; transfer aborted."));
        assert!(!close);
    }

    #[test]
    fn storage_errors_keep_their_code_and_message() {
        let err = storage::Error::with_message(ErrorKind::NoSuchFile, "No such file");
        let (reply, _) = handle_internal_msg(&logger(), ControlChanMsg::StorageError(err));
        assert_eq!(reply, Reply::new(ReplyCode::NoSuchFileOrDirectory, "No such file"));
    }

    #[test]
    fn unpaired_data_connection_closes_the_session() {
        let (reply, close) = handle_internal_msg(&logger(), ControlChanMsg::UnpairedDataConnection);
        assert_eq!(reply, Reply::with_default_message(ReplyCode::ServiceNotAvailable));
        assert!(close);
    }
}
