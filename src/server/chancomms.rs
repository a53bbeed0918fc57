//! Contains code pertaining to the communication between the data and control channels.

use super::session::EventSource;
use crate::storage::{self, Filesystem};
use derive_more::Display;

/// The transfers a data connection can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TransferKind {
    /// Send a directory listing.
    #[display("LIST")]
    List,
    /// Send a file.
    #[display("RETR")]
    Retr,
    /// Receive a file.
    #[display("STOR")]
    Stor,
}

// A transfer waiting for its data connection. It carries a snapshot of the session's filesystem
// so that a later CWD does not change what it refers to.
#[derive(Debug)]
pub struct DataCommand {
    pub kind: TransferKind,
    /// The path as specified by the client
    pub path: String,
    pub fs: Filesystem,
    pub events: EventSource,
}

/// Messages that can be sent to the control channel loop.
#[derive(Debug, Display)]
pub enum ControlChanMsg {
    /// A data connection was paired with a transfer and bytes are about to flow.
    #[display("Data connection open")]
    DataConnectionOpen,
    /// The transfer finished and the data connection was closed.
    #[display("Transfer complete")]
    TransferComplete,
    /// The filesystem refused the transfer.
    #[display("Storage error: {_0}")]
    StorageError(storage::Error),
    /// The data connection broke off before the transfer finished.
    #[display("Data connection reset")]
    ConnectionReset,
    /// The server could not connect to the endpoint given with `PORT`.
    #[display("Data connection failed")]
    DataConnectionFailed,
    /// A peer connected to the passive listener without a transfer to pair it with.
    #[display("Unpaired data connection")]
    UnpairedDataConnection,
    /// Quit the client connection
    #[display("Exit control loop")]
    ExitControlLoop,
}
