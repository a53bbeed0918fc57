//! Contains code pertaining to the FTP *data* channel
//!
//! A data connection is negotiated with `PASV` or `PORT` and carries exactly one transfer. In
//! passive mode transfers are queued and handed out, oldest first, to peers in the order they
//! connect. In active mode the server connects to the client as soon as a transfer is requested.
//!
//! The outcome of every transfer is reported to the control loop as a [`ControlChanMsg`].

use super::chancomms::{ControlChanMsg, DataCommand, TransferKind};
use crate::{
    notification::SessionObserver,
    storage::{self, ErrorKind},
    watchdog::{TransferWatchdog, WatchdogConfig, WatchdogSignal},
};

use futures_util::StreamExt;
use std::{
    collections::VecDeque,
    io,
    net::{IpAddr, SocketAddr},
    path::Path,
    sync::Arc,
    time::Duration,
};
use thiserror::Error;
use tokio::{
    io::AsyncWriteExt,
    net::{TcpListener, TcpStream},
    sync::{Mutex, Notify, OwnedMutexGuard, broadcast, mpsc, oneshot},
    time::{Instant, timeout_at},
};
use tokio_util::sync::CancellationToken;

/// What the data channel tasks of one session need.
#[derive(Debug, Clone)]
pub struct DataConfig {
    pub tx: mpsc::Sender<ControlChanMsg>,
    pub observer: Arc<dyn SessionObserver>,
    pub watchdog: WatchdogConfig,
    /// How long a passive peer may wait for its transfer to be queued.
    pub grace: Duration,
    pub logger: slog::Logger,
}

/// Returned when a transfer is requested before `PASV` or `PORT`.
#[derive(Debug, Error)]
#[error("no data connection was set up with PASV or PORT")]
pub struct NoDataConnection;

#[derive(Debug, Error)]
enum TransferError {
    #[error("storage error")]
    Storage(#[from] storage::Error),
    #[error("data connection error")]
    Connection(#[from] io::Error),
}

#[derive(Debug)]
enum DataMode {
    None,
    Active(SocketAddr),
    // Dropping the sender stops the accept loop of listener `generation`.
    Passive { generation: u64, _stop: oneshot::Sender<()> },
}

#[derive(Debug)]
struct DataState {
    mode: DataMode,
    queue: VecDeque<DataCommand>,
    generation: u64,
    // Peers accepted on a passive listener that have not been given a transfer yet.
    waiting_peers: usize,
}

#[derive(Debug)]
struct Shared {
    config: DataConfig,
    state: Mutex<DataState>,
    queued: Notify,
    // Owned by the data connection currently pairing or transferring. Handed out in FIFO order.
    turn: Arc<Mutex<()>>,
    cancel: CancellationToken,
}

/// The data connections of one session. Clones refer to the same state.
#[derive(Debug, Clone)]
pub struct DataConnections {
    shared: Arc<Shared>,
}

impl DataConnections {
    pub fn new(config: DataConfig) -> Self {
        DataConnections {
            shared: Arc::new(Shared {
                config,
                state: Mutex::new(DataState {
                    mode: DataMode::None,
                    queue: VecDeque::new(),
                    generation: 0,
                    waiting_peers: 0,
                }),
                queued: Notify::new(),
                turn: Arc::new(Mutex::new(())),
                cancel: CancellationToken::new(),
            }),
        }
    }

    /// Listens on an ephemeral port of `ip`, replacing any previous listener or active endpoint,
    /// and returns the bound address.
    pub async fn enter_passive(&self, ip: IpAddr) -> io::Result<SocketAddr> {
        let listener = TcpListener::bind(SocketAddr::new(ip, 0)).await?;
        let local_addr = listener.local_addr()?;
        let (stop_tx, stop_rx) = oneshot::channel();
        let generation = {
            let mut state = self.shared.state.lock().await;
            state.generation += 1;
            state.mode = DataMode::Passive {
                generation: state.generation,
                _stop: stop_tx,
            };
            state.generation
        };
        tokio::spawn(self.clone().accept_loop(listener, generation, stop_rx));
        Ok(local_addr)
    }

    /// Records the endpoint to connect to for the next transfers, closing any passive listener.
    pub async fn enter_active(&self, endpoint: SocketAddr) {
        self.shared.state.lock().await.mode = DataMode::Active(endpoint);
    }

    /// Queues the transfer in passive mode or connects to the client for it in active mode.
    pub async fn transfer(&self, cmd: DataCommand) -> Result<(), NoDataConnection> {
        let mut guard = self.shared.state.lock().await;
        let state = &mut *guard;
        match &state.mode {
            DataMode::None => Err(NoDataConnection),
            DataMode::Passive { .. } => {
                state.queue.push_back(cmd);
                self.shared.queued.notify_one();
                Ok(())
            }
            DataMode::Active(endpoint) => {
                tokio::spawn(self.clone().serve_active(*endpoint, cmd));
                Ok(())
            }
        }
    }

    /// Stops the listener, abandons queued transfers and aborts the running one. An aborted upload
    /// keeps what was written so far and its watchdog is dropped with it. Nothing is reported to
    /// the control channel since it is going away.
    pub async fn close(&self) {
        self.shared.cancel.cancel();
        let mut state = self.shared.state.lock().await;
        state.mode = DataMode::None;
        state.queue.clear();
    }

    async fn accept_loop(self, listener: TcpListener, generation: u64, mut stop: oneshot::Receiver<()>) {
        let logger = self.shared.config.logger.new(slog::o!("listener" => generation));
        loop {
            let socket = tokio::select! {
                biased;
                _ = &mut stop => break,
                _ = self.shared.cancel.cancelled() => break,
                accepted = listener.accept() => match accepted {
                    Ok((socket, peer)) => {
                        slog::debug!(logger, "Incoming passive data connection"; "peer" => %peer);
                        socket
                    }
                    Err(err) => {
                        slog::warn!(logger, "Error accepting passive data connection"; "error" => %err);
                        continue;
                    }
                },
            };
            self.shared.state.lock().await.waiting_peers += 1;
            let turn = tokio::select! {
                biased;
                _ = self.shared.cancel.cancelled() => break,
                turn = self.shared.turn.clone().lock_owned() => turn,
            };
            tokio::spawn(self.clone().serve_passive(socket, generation, turn));
        }
        slog::debug!(logger, "Passive listener closed");
    }

    async fn serve_passive(self, socket: TcpStream, generation: u64, _turn: OwnedMutexGuard<()>) {
        let cancel = self.shared.cancel.clone();
        tokio::select! {
            _ = cancel.cancelled() => {}
            _ = self.pair_and_execute(socket, generation) => {}
        }
    }

    async fn pair_and_execute(&self, socket: TcpStream, generation: u64) {
        let next = self.next_queued().await;
        {
            let mut state = self.shared.state.lock().await;
            state.waiting_peers = state.waiting_peers.saturating_sub(1);
        }
        let Some(cmd) = next else {
            slog::warn!(self.shared.config.logger, "Data connection without a pending transfer");
            self.notify(ControlChanMsg::UnpairedDataConnection).await;
            return;
        };
        self.execute(socket, cmd).await;

        let mut state = self.shared.state.lock().await;
        let current = matches!(state.mode, DataMode::Passive { generation: g, .. } if g == generation);
        if current && state.queue.is_empty() && state.waiting_peers == 0 {
            state.mode = DataMode::None;
        }
    }

    // Waits up to the grace period for a transfer to pair a freshly accepted peer with.
    async fn next_queued(&self) -> Option<DataCommand> {
        let deadline = Instant::now() + self.shared.config.grace;
        loop {
            if let Some(cmd) = self.shared.state.lock().await.queue.pop_front() {
                return Some(cmd);
            }
            if timeout_at(deadline, self.shared.queued.notified()).await.is_err() {
                return None;
            }
        }
    }

    async fn serve_active(self, endpoint: SocketAddr, cmd: DataCommand) {
        let cancel = self.shared.cancel.clone();
        tokio::select! {
            _ = cancel.cancelled() => {}
            _ = async {
                let _turn = self.shared.turn.lock().await;
                match TcpStream::connect(endpoint).await {
                    Ok(socket) => self.execute(socket, cmd).await,
                    Err(err) => {
                        slog::warn!(self.shared.config.logger, "Could not connect to client"; "endpoint" => %endpoint, "error" => %err);
                        self.notify(ControlChanMsg::DataConnectionFailed).await;
                    }
                }
            } => {}
        }
    }

    #[tracing_attributes::instrument(skip(self, socket))]
    async fn execute(&self, socket: TcpStream, cmd: DataCommand) {
        let logger = self.shared.config.logger.new(slog::o!("cmd" => cmd.kind.to_string(), "path" => cmd.path.clone()));
        self.notify(ControlChanMsg::DataConnectionOpen).await;

        let result = match cmd.kind {
            TransferKind::List => self.send_listing(socket, &cmd).await,
            TransferKind::Retr => self.send_file(socket, &cmd).await,
            TransferKind::Stor => self.receive_file(socket, &cmd, &logger).await,
        };

        let msg = match result {
            Ok(()) => {
                slog::info!(logger, "Transfer complete");
                ControlChanMsg::TransferComplete
            }
            Err(TransferError::Storage(err)) => {
                slog::warn!(logger, "Transfer refused by storage"; "error" => %err);
                ControlChanMsg::StorageError(err)
            }
            Err(TransferError::Connection(err)) => {
                slog::warn!(logger, "Transfer aborted"; "error" => %err);
                ControlChanMsg::ConnectionReset
            }
        };
        self.notify(msg).await;
    }

    async fn send_listing(&self, mut socket: TcpStream, cmd: &DataCommand) -> Result<(), TransferError> {
        let mut lines = cmd.fs.list(&cmd.path).await?;
        while let Some(line) = lines.next().await {
            socket.write_all(line?.as_bytes()).await?;
        }
        socket.shutdown().await?;
        Ok(())
    }

    async fn send_file(&self, mut socket: TcpStream, cmd: &DataCommand) -> Result<(), TransferError> {
        let observer = &self.shared.config.observer;
        observer.retr_begin(&cmd.events.meta(), &cmd.path).await;
        let mut file = cmd.fs.read_file(&cmd.path).await?;
        tokio::io::copy(&mut file, &mut socket).await?;
        socket.shutdown().await?;
        observer.retr_end(&cmd.events.meta(), &cmd.path).await;
        Ok(())
    }

    async fn receive_file(&self, mut socket: TcpStream, cmd: &DataCommand, logger: &slog::Logger) -> Result<(), TransferError> {
        let observer = &self.shared.config.observer;
        let absolute = cmd.fs.resolve(&cmd.path).ok_or_else(|| storage::Error::from(ErrorKind::PermissionDenied))?;
        observer.stor_begin(&cmd.events.meta(), &cmd.path, &absolute).await;

        let result = self.copy_upload(&mut socket, cmd, &absolute, logger).await;
        match &result {
            Ok(()) => observer.stor_end(&cmd.events.meta(), &cmd.path, &absolute).await,
            Err(TransferError::Storage(err)) => observer.stor_error(&cmd.events.meta(), &cmd.path, err).await,
            Err(TransferError::Connection(err)) => {
                let err = storage::Error::with_message(ErrorKind::LocalError, err.to_string());
                observer.stor_error(&cmd.events.meta(), &cmd.path, &err).await
            }
        }
        result
    }

    // Copies the upload into the file until the client closes the data connection or the
    // watchdog finds the file has stopped growing, whichever comes first.
    async fn copy_upload(&self, socket: &mut TcpStream, cmd: &DataCommand, absolute: &Path, logger: &slog::Logger) -> Result<(), TransferError> {
        let mut file = cmd.fs.write_file(&cmd.path).await?;

        let (done_tx, mut done_rx) = oneshot::channel();
        let mut watchdog = TransferWatchdog::watch(absolute, self.shared.config.watchdog, move |outcome| {
            let _ = done_tx.send(outcome);
        });
        let mut signals = watchdog.subscribe();
        let mut watching = true;
        let mut signalling = true;

        let copied = {
            let copy = tokio::io::copy(socket, &mut file);
            tokio::pin!(copy);
            loop {
                tokio::select! {
                    copied = &mut copy => break copied.map(|_| ()).map_err(TransferError::from),
                    outcome = &mut done_rx, if watching => {
                        watching = false;
                        match outcome {
                            Ok(Ok(metadata)) => {
                                slog::info!(logger, "Upload stopped growing, ending transfer"; "size" => metadata.len());
                                break Ok(());
                            }
                            Ok(Err(err)) => slog::warn!(logger, "Upload watchdog failed"; "error" => %err),
                            Err(_) => {}
                        }
                    }
                    signal = signals.recv(), if signalling => match signal {
                        Ok(WatchdogSignal::Change { kbps, .. }) => {
                            self.shared.config.observer.stor_progress(&cmd.events.meta(), &cmd.path, kbps).await;
                        }
                        Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                        Err(broadcast::error::RecvError::Closed) => signalling = false,
                    },
                }
            }
        };

        watchdog.close();
        file.flush().await.map_err(storage::Error::from)?;
        copied
    }

    async fn notify(&self, msg: ControlChanMsg) {
        if let Err(err) = self.shared.config.tx.send(msg).await {
            slog::warn!(self.shared.config.logger, "Could not notify control channel"; "message" => %err.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        notification::NopObserver,
        server::session::{EventSource, SessionId},
        storage::Filesystem,
    };
    use pretty_assertions::assert_eq;
    use std::net::Ipv4Addr;
    use tempfile::TempDir;
    use tokio::io::AsyncReadExt;

    fn data_connections(grace: Duration) -> (DataConnections, mpsc::Receiver<ControlChanMsg>) {
        let (tx, rx) = mpsc::channel(16);
        let config = DataConfig {
            tx,
            observer: Arc::new(NopObserver),
            watchdog: WatchdogConfig::default(),
            grace,
            logger: slog::Logger::root(slog::Discard, slog::o!()),
        };
        (DataConnections::new(config), rx)
    }

    fn command(kind: TransferKind, path: &str, root: &TempDir) -> DataCommand {
        DataCommand {
            kind,
            path: path.to_string(),
            fs: Filesystem::new(root.path()),
            events: EventSource::new(SessionId::new()),
        }
    }

    async fn read_all(mut peer: TcpStream) -> String {
        let mut received = String::new();
        peer.read_to_string(&mut received).await.unwrap();
        received
    }

    async fn expect_transfer_complete(rx: &mut mpsc::Receiver<ControlChanMsg>) {
        assert!(matches!(rx.recv().await, Some(ControlChanMsg::DataConnectionOpen)));
        assert!(matches!(rx.recv().await, Some(ControlChanMsg::TransferComplete)));
    }

    #[tokio::test]
    async fn transfer_needs_a_data_connection() {
        let root = TempDir::new().unwrap();
        let (data, _rx) = data_connections(Duration::from_secs(1));
        assert!(data.transfer(command(TransferKind::List, "/", &root)).await.is_err());
    }

    #[tokio::test]
    async fn passive_peers_pair_with_transfers_in_order() {
        let root = TempDir::new().unwrap();
        std::fs::write(root.path().join("first.txt"), "first").unwrap();
        std::fs::write(root.path().join("second.txt"), "second").unwrap();
        let (data, mut rx) = data_connections(Duration::from_secs(5));

        let addr = data.enter_passive(Ipv4Addr::LOCALHOST.into()).await.unwrap();
        data.transfer(command(TransferKind::Retr, "first.txt", &root)).await.unwrap();
        data.transfer(command(TransferKind::Retr, "second.txt", &root)).await.unwrap();

        let peer1 = TcpStream::connect(addr).await.unwrap();
        let peer2 = TcpStream::connect(addr).await.unwrap();
        assert_eq!(read_all(peer1).await, "first");
        assert_eq!(read_all(peer2).await, "second");

        expect_transfer_complete(&mut rx).await;
        expect_transfer_complete(&mut rx).await;
    }

    #[tokio::test]
    async fn early_peer_waits_for_its_transfer() {
        let root = TempDir::new().unwrap();
        std::fs::write(root.path().join("late.txt"), "late").unwrap();
        let (data, mut rx) = data_connections(Duration::from_secs(5));

        let addr = data.enter_passive(Ipv4Addr::LOCALHOST.into()).await.unwrap();
        let peer = TcpStream::connect(addr).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        data.transfer(command(TransferKind::Retr, "late.txt", &root)).await.unwrap();

        assert_eq!(read_all(peer).await, "late");
        expect_transfer_complete(&mut rx).await;
    }

    #[tokio::test]
    async fn unpaired_passive_peer_is_reported() {
        let (data, mut rx) = data_connections(Duration::from_millis(100));
        let addr = data.enter_passive(Ipv4Addr::LOCALHOST.into()).await.unwrap();
        let _peer = TcpStream::connect(addr).await.unwrap();
        assert!(matches!(rx.recv().await, Some(ControlChanMsg::UnpairedDataConnection)));
    }

    #[tokio::test]
    async fn active_mode_connects_to_the_client() {
        let root = TempDir::new().unwrap();
        std::fs::create_dir(root.path().join("music")).unwrap();
        let (data, mut rx) = data_connections(Duration::from_secs(1));

        let client = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        data.enter_active(client.local_addr().unwrap()).await;
        data.transfer(command(TransferKind::List, "/", &root)).await.unwrap();

        let (peer, _) = client.accept().await.unwrap();
        let listing = read_all(peer).await;
        assert!(listing.starts_with('d'));
        assert!(listing.ends_with(" music\r\n"));
        expect_transfer_complete(&mut rx).await;
    }

    #[tokio::test]
    async fn active_mode_reports_failed_connect() {
        let root = TempDir::new().unwrap();
        let (data, mut rx) = data_connections(Duration::from_secs(1));

        let unused = {
            let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
            listener.local_addr().unwrap()
        };
        data.enter_active(unused).await;
        data.transfer(command(TransferKind::List, "/", &root)).await.unwrap();
        assert!(matches!(rx.recv().await, Some(ControlChanMsg::DataConnectionFailed)));
    }

    #[tokio::test]
    async fn missing_file_is_a_storage_error() {
        let root = TempDir::new().unwrap();
        let (data, mut rx) = data_connections(Duration::from_secs(5));

        let addr = data.enter_passive(Ipv4Addr::LOCALHOST.into()).await.unwrap();
        data.transfer(command(TransferKind::Retr, "nope.txt", &root)).await.unwrap();
        let _peer = TcpStream::connect(addr).await.unwrap();

        assert!(matches!(rx.recv().await, Some(ControlChanMsg::DataConnectionOpen)));
        match rx.recv().await {
            Some(ControlChanMsg::StorageError(err)) => assert_eq!(err.code(), 431),
            other => panic!("unexpected message {:?}", other),
        }
    }

    #[tokio::test]
    async fn close_abandons_queued_transfers() {
        let root = TempDir::new().unwrap();
        let (data, _rx) = data_connections(Duration::from_secs(5));
        data.enter_passive(Ipv4Addr::LOCALHOST.into()).await.unwrap();
        data.transfer(command(TransferKind::List, "/", &root)).await.unwrap();
        data.close().await;
        assert!(data.transfer(command(TransferKind::List, "/", &root)).await.is_err());
    }

    #[tokio::test]
    async fn close_aborts_the_running_upload() {
        let root = TempDir::new().unwrap();
        let (data, mut rx) = data_connections(Duration::from_secs(5));

        let addr = data.enter_passive(Ipv4Addr::LOCALHOST.into()).await.unwrap();
        data.transfer(command(TransferKind::Stor, "upload.bin", &root)).await.unwrap();
        let mut peer = TcpStream::connect(addr).await.unwrap();
        peer.write_all(b"partial").await.unwrap();
        assert!(matches!(rx.recv().await, Some(ControlChanMsg::DataConnectionOpen)));

        data.close().await;

        let mut buf = [0u8; 8];
        let read = tokio::time::timeout(Duration::from_secs(5), peer.read(&mut buf)).await.unwrap();
        assert!(matches!(read, Ok(0) | Err(_)));
        assert!(tokio::time::timeout(Duration::from_millis(300), rx.recv()).await.is_err());
    }
}
