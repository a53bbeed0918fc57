//! Contains the sandboxed [`Filesystem`] that sessions use to reach the files they serve.

mod error;
pub use error::{Error, ErrorKind};

mod filesystem;
pub use filesystem::{Filesystem, Listing};

/// Result type used by the filesystem operations
pub type Result<T> = std::result::Result<T, Error>;
