use crate::notification::event::{ServerObserver, SessionObserver};

/// An observer that does nothing. Used as a default Null Object in [`ServerBuilder`](crate::ServerBuilder).
#[derive(Debug)]
pub struct NopObserver;

impl SessionObserver for NopObserver {}

impl ServerObserver for NopObserver {}
