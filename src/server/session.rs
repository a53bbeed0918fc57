//! Per-connection session state shared by the control loop and the command handlers.

use super::datachan::DataConnections;
use crate::{notification::EventMeta, storage::Filesystem};

use derive_more::Display;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use tokio::sync::Mutex;
use uuid::Uuid;

/// A session is shared between the control loop and the command handlers.
pub type SharedSession = Arc<Mutex<Session>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    New,
    WaitPass,
    WaitCmd,
}

/// The representation type given with `TYPE`. No conversion happens either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TransferType {
    #[display("A")]
    Ascii,
    #[display("I")]
    Binary,
}

/// Identifies one control connection. Two connections from the same address get two ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display("{_0}")]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        SessionId(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        SessionId::new()
    }
}

// Produces the `EventMeta` handed to observers. Clones share the sequence counter so events sent
// from data channel tasks stay ordered with those of the control loop.
#[derive(Debug, Clone)]
pub struct EventSource {
    trace_id: SessionId,
    username: Option<String>,
    sequence: Arc<AtomicU64>,
}

impl EventSource {
    pub fn new(trace_id: SessionId) -> Self {
        EventSource {
            trace_id,
            username: None,
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn meta(&self) -> EventMeta {
        EventMeta {
            username: self.username.clone(),
            trace_id: self.trace_id.to_string(),
            sequence_number: self.sequence.fetch_add(1, Ordering::Relaxed) + 1,
        }
    }
}

// This is where we keep the state for a ftp session.
#[derive(Debug)]
pub struct Session {
    pub state: SessionState,
    pub username: Option<String>,
    pub auth_failures: u32,
    pub transfer_type: TransferType,
    pub rename_from: Option<String>,
    pub fs: Filesystem,
    pub data: DataConnections,
    events: EventSource,
}

impl Session {
    pub fn new(trace_id: SessionId, fs: Filesystem, data: DataConnections) -> Self {
        Session {
            state: SessionState::New,
            username: None,
            auth_failures: 0,
            transfer_type: TransferType::Binary,
            rename_from: None,
            fs,
            data,
            events: EventSource::new(trace_id),
        }
    }

    pub fn authenticated(&self) -> bool {
        self.state == SessionState::WaitCmd
    }

    /// An event source carrying the current username.
    pub fn event_source(&self) -> EventSource {
        EventSource {
            username: self.username.clone(),
            ..self.events.clone()
        }
    }

    pub fn event_meta(&self) -> EventMeta {
        self.event_source().meta()
    }
}
