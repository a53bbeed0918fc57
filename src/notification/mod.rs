#![deny(missing_docs)]
//!
//! Allows users to observe what happens inside the server.
//!
//! To follow what clients do implement the [`SessionObserver`] trait and pass it to
//! [`ServerBuilder::observer`](crate::ServerBuilder::observer). Every method has an empty default
//! body so only the notifications of interest need implementing.
//!
//! To learn when the server is up, or why it stopped, implement the [`ServerObserver`] trait and
//! pass it to [`ServerBuilder::server_observer`](crate::ServerBuilder::server_observer).
//!

pub(crate) mod event;
pub(crate) mod nop;

pub use event::{EventMeta, ServerObserver, SessionObserver};
pub use nop::NopObserver;
