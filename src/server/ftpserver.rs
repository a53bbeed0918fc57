pub(crate) mod error;
mod listen;
pub mod options;

use self::{
    error::{ServerError, ServerErrorKind},
    options::{BindRetry, PassiveHost},
};
use super::controlchan;
use crate::{
    auth::{AnonymousAuthenticator, Authenticator},
    notification::{NopObserver, ServerObserver, SessionObserver},
    watchdog::WatchdogConfig,
};

use slog::Drain;
use std::{fmt::Debug, future::Future, net::SocketAddr, path::PathBuf, pin::Pin, sync::Arc, time::Duration};

type ShutdownSignal = Pin<Box<dyn Future<Output = ()> + Send>>;

/// An instance of an FTP server. It serves the directory given to [`ServerBuilder::new`] and asks
/// an [`Authenticator`] who may log in.
///
/// The server can be started with the [`listen`](Server::listen) method.
///
/// # Example
///
/// ```no_run
/// use libftpd::ServerBuilder;
///
/// # #[tokio::main]
/// # async fn main() {
/// let server = ServerBuilder::new(std::env::temp_dir()).build().unwrap();
/// server.listen("127.0.0.1:2121").await.unwrap();
/// # }
/// ```
pub struct Server {
    root: PathBuf,
    greeting: String,
    authenticator: Arc<dyn Authenticator>,
    observer: Arc<dyn SessionObserver>,
    server_observer: Arc<dyn ServerObserver>,
    passive_mode: bool,
    passive_host: PassiveHost,
    autocreate_directories: bool,
    watchdog: WatchdogConfig,
    data_connection_grace: Duration,
    bind_retry: BindRetry,
    shutdown: ShutdownSignal,
    logger: slog::Logger,
}

/// Used to create [`Server`]s.
///
/// ```no_run
/// use libftpd::{ServerBuilder, options::PassiveHost};
///
/// let server = ServerBuilder::new("/srv/ftp")
///     .greeting("Welcome to my FTP server")
///     .passive_host(PassiveHost::Ip([203, 0, 113, 7].into()))
///     .build()
///     .unwrap();
/// ```
pub struct ServerBuilder {
    root: PathBuf,
    greeting: String,
    authenticator: Arc<dyn Authenticator>,
    observer: Arc<dyn SessionObserver>,
    server_observer: Arc<dyn ServerObserver>,
    passive_mode: bool,
    passive_host: PassiveHost,
    autocreate_directories: bool,
    watchdog: WatchdogConfig,
    data_connection_grace: Duration,
    bind_retry: BindRetry,
    verbosity: u8,
    shutdown: ShutdownSignal,
    logger: slog::Logger,
}

impl ServerBuilder {
    /// Starts building a server that serves `root`. Clients cannot reach anything outside it.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        ServerBuilder {
            root: root.into(),
            greeting: options::DEFAULT_GREETING.to_string(),
            authenticator: Arc::new(AnonymousAuthenticator),
            observer: Arc::new(NopObserver),
            server_observer: Arc::new(NopObserver),
            passive_mode: options::DEFAULT_PASSIVE_MODE,
            passive_host: options::DEFAULT_PASSIVE_HOST,
            autocreate_directories: options::DEFAULT_AUTOCREATE_DIRECTORIES,
            watchdog: WatchdogConfig::default(),
            data_connection_grace: options::DEFAULT_DATA_CONNECTION_GRACE,
            bind_retry: BindRetry::default(),
            verbosity: options::DEFAULT_VERBOSITY,
            shutdown: Box::pin(std::future::pending()),
            logger: slog::Logger::root(slog_stdlog::StdLog.fuse(), slog::o!()),
        }
    }

    /// Set the greeting that will be sent to the client after connecting.
    pub fn greeting<S: Into<String>>(mut self, greeting: S) -> Self {
        self.greeting = greeting.into();
        self
    }

    /// Set the [`Authenticator`] that decides who may log in. Defaults to
    /// [`AnonymousAuthenticator`].
    pub fn authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = authenticator;
        self
    }

    /// Register a [`SessionObserver`] that is told about logins, directory changes and transfers.
    pub fn observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Register a [`ServerObserver`] that is told when the server is listening or fails.
    pub fn server_observer(mut self, observer: Arc<dyn ServerObserver>) -> Self {
        self.server_observer = observer;
        self
    }

    /// Enables or disables `PASV`. When disabled `PASV` is answered with 500.
    pub fn passive_mode(mut self, enabled: bool) -> Self {
        self.passive_mode = enabled;
        self
    }

    /// Decides which IP address is sent in the `PASV` reply.
    pub fn passive_host<H: Into<PassiveHost>>(mut self, host: H) -> Self {
        self.passive_host = host.into();
        self
    }

    /// Whether `CWD` into a missing directory creates it.
    pub fn autocreate_directories(mut self, enabled: bool) -> Self {
        self.autocreate_directories = enabled;
        self
    }

    /// Tunes how uploads that stop growing are detected as finished.
    pub fn upload_watchdog(mut self, config: WatchdogConfig) -> Self {
        self.watchdog = config;
        self
    }

    /// How long a passive data connection waits for its transfer command before the session is
    /// closed with 421.
    pub fn data_connection_grace(mut self, grace: Duration) -> Self {
        self.data_connection_grace = grace;
        self
    }

    /// How to retry when the listen address is in use.
    pub fn bind_retry(mut self, retry: BindRetry) -> Self {
        self.bind_retry = retry;
        self
    }

    /// Filters the log output. See [`options::log_level`] for the mapping.
    pub fn verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Sets the structured logger to use. Defaults to forwarding to the `log` crate.
    pub fn logger<L: Into<Option<slog::Logger>>>(mut self, logger: L) -> Self {
        self.logger = logger.into().unwrap_or_else(|| slog::Logger::root(slog::Discard, slog::o!()));
        self
    }

    /// Stops accepting control connections once `indicator` resolves. Sessions that are already
    /// connected carry on.
    pub fn shutdown_indicator<I>(mut self, indicator: I) -> Self
    where
        I: Future<Output = ()> + Send + 'static,
    {
        self.shutdown = Box::pin(indicator);
        self
    }

    /// Creates the server. Fails when the root is not an existing directory.
    pub fn build(self) -> Result<Server, ServerError> {
        let root = std::fs::canonicalize(&self.root)
            .map_err(|e| ServerError::new(ServerErrorKind::InvalidRoot, format!("cannot use {} as root", self.root.display()), e))?;
        if !root.is_dir() {
            return Err(ServerError::new(
                ServerErrorKind::InvalidRoot,
                format!("{} is not a directory", root.display()),
                std::io::Error::from(std::io::ErrorKind::NotADirectory),
            ));
        }
        let level = options::log_level(self.verbosity);
        let logger = slog::Logger::root(slog::LevelFilter::new(self.logger, level).ignore_res(), slog::o!());
        Ok(Server {
            root,
            greeting: self.greeting,
            authenticator: self.authenticator,
            observer: self.observer,
            server_observer: self.server_observer,
            passive_mode: self.passive_mode,
            passive_host: self.passive_host,
            autocreate_directories: self.autocreate_directories,
            watchdog: self.watchdog,
            data_connection_grace: self.data_connection_grace,
            bind_retry: self.bind_retry,
            shutdown: self.shutdown,
            logger,
        })
    }
}

impl Debug for ServerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerBuilder")
            .field("root", &self.root)
            .field("greeting", &self.greeting)
            .field("authenticator", &self.authenticator)
            .field("observer", &self.observer)
            .field("server_observer", &self.server_observer)
            .field("passive_mode", &self.passive_mode)
            .field("passive_host", &self.passive_host)
            .field("autocreate_directories", &self.autocreate_directories)
            .field("watchdog", &self.watchdog)
            .field("data_connection_grace", &self.data_connection_grace)
            .field("bind_retry", &self.bind_retry)
            .field("verbosity", &self.verbosity)
            .finish()
    }
}

impl Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("root", &self.root)
            .field("greeting", &self.greeting)
            .field("passive_mode", &self.passive_mode)
            .field("passive_host", &self.passive_host)
            .field("bind_retry", &self.bind_retry)
            .finish()
    }
}

impl Server {
    /// Runs the server on `bind_address` until the shutdown indicator resolves.
    ///
    /// Binding is retried while the address is in use, see [`ServerBuilder::bind_retry`]. Errors
    /// are also passed to the [`ServerObserver`].
    #[tracing_attributes::instrument(skip(self))]
    pub async fn listen<T: Into<String> + Debug>(self, bind_address: T) -> Result<(), ServerError> {
        let observer = self.server_observer.clone();
        let logger = self.logger.clone();
        let result = self.serve(bind_address.into()).await;
        if let Err(err) = &result {
            slog::error!(logger, "Server stopped"; "error" => %err);
            observer.error(err).await;
        }
        result
    }

    async fn serve(self, bind_address: String) -> Result<(), ServerError> {
        let bind_address: SocketAddr = bind_address.parse()?;
        let options = controlchan::LoopConfig {
            root: self.root,
            greeting: self.greeting,
            authenticator: self.authenticator,
            observer: self.observer,
            passive_mode: self.passive_mode,
            passive_host: self.passive_host,
            autocreate_directories: self.autocreate_directories,
            watchdog: self.watchdog,
            data_connection_grace: self.data_connection_grace,
            logger: self.logger.clone(),
        };
        listen::Listener {
            bind_address,
            bind_retry: self.bind_retry,
            logger: self.logger,
            options,
            observer: self.server_observer,
            shutdown: self.shutdown,
        }
        .listen()
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn build_rejects_missing_root() {
        let err = ServerBuilder::new("/this/does/not/exist").build().unwrap_err();
        assert_eq!(err.kind(), ServerErrorKind::InvalidRoot);
    }

    #[test]
    fn build_rejects_file_root() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = ServerBuilder::new(file.path()).build().unwrap_err();
        assert_eq!(err.kind(), ServerErrorKind::InvalidRoot);
    }

    #[tokio::test]
    async fn listen_rejects_bad_address() {
        let root = tempfile::tempdir().unwrap();
        let server = ServerBuilder::new(root.path()).build().unwrap();
        let err = server.listen("not an address").await.unwrap_err();
        assert_eq!(err.kind(), ServerErrorKind::InvalidAddress);
    }
}
