//! Contains the `Server` struct that is used to configure and control an FTP server instance.

mod chancomms;
mod controlchan;
mod datachan;
pub(crate) mod ftpserver;
mod session;

pub use controlchan::ReplyCode;
pub use ftpserver::{
    Server, ServerBuilder,
    error::{ServerError, ServerErrorKind},
    options,
};
