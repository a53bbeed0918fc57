use crate::{ServerError, storage};
use async_trait::async_trait;
use std::fmt::Debug;
use std::net::SocketAddr;
use std::path::Path;

/// Metadata relating to an event that can be used to to identify the user and session. A sequence
/// number is also included to allow ordering in systems where event ordering is not guaranteed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventMeta {
    /// The user this event pertains to, if one was given already.
    pub username: Option<String>,
    /// Identifies a single session pertaining to a connected client. Distinct connections from the
    /// same address get distinct ids.
    pub trace_id: String,
    /// The event sequence number as incremented per session.
    pub sequence_number: u64,
}

/// Receives the lifecycle notifications of every session. Paths are given the way the client
/// sent them unless named `absolute`.
#[async_trait]
pub trait SessionObserver: Sync + Send + Debug {
    /// A client connected.
    async fn connected(&self, _meta: &EventMeta, _peer: SocketAddr) {}

    /// The working directory changed.
    async fn cwd_changed(&self, _meta: &EventMeta, _cwd: &str) {}

    /// A download was requested.
    async fn retr(&self, _meta: &EventMeta, _file: &str) {}

    /// A download started sending bytes.
    async fn retr_begin(&self, _meta: &EventMeta, _file: &str) {}

    /// A download finished.
    async fn retr_end(&self, _meta: &EventMeta, _file: &str) {}

    /// An upload was requested.
    async fn stor(&self, _meta: &EventMeta, _file: &str) {}

    /// An upload started writing to `absolute`.
    async fn stor_begin(&self, _meta: &EventMeta, _file: &str, _absolute: &Path) {}

    /// The file being uploaded grew. `kbps` is the current write rate in KiB/s.
    async fn stor_progress(&self, _meta: &EventMeta, _file: &str, _kbps: f64) {}

    /// An upload finished. Called once per upload, whether the client closed the data connection or
    /// the file stopped growing.
    async fn stor_end(&self, _meta: &EventMeta, _file: &str, _absolute: &Path) {}

    /// An upload failed.
    async fn stor_error(&self, _meta: &EventMeta, _file: &str, _error: &storage::Error) {}

    /// The client said goodbye with `QUIT`.
    async fn quit(&self, _meta: &EventMeta) {}
}

/// Receives notifications about the server as a whole.
#[async_trait]
pub trait ServerObserver: Sync + Send + Debug {
    /// The server is listening on `addr`.
    async fn ready(&self, _addr: SocketAddr) {}

    /// The server stopped because of `error`.
    async fn error(&self, _error: &ServerError) {}
}
