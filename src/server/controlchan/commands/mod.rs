//! This module contains the implementations for the FTP commands defined in
//!
//! - [RFC 959 - FTP](https://tools.ietf.org/html/rfc959)
//! - [RFC 3659 - Extensions to FTP](https://tools.ietf.org/html/rfc3659)
//! - [RFC 2389 - Feature negotiation mechanism for FTP](https://tools.ietf.org/html/rfc2389)

mod cdup;
mod cwd;
mod dele;
mod feat;
mod list;
mod mkd;
mod pass;
mod pasv;
mod port;
mod pwd;
mod quit;
mod retr;
mod rnfr;
mod rnto;
mod size;
mod stor;
mod stub;
mod syst;
mod transfer_common;
mod type_;
mod user;

pub use cdup::Cdup;
pub use cwd::Cwd;
pub use dele::Dele;
pub use feat::Feat;
pub use list::List;
pub use mkd::Mkd;
pub use pass::Pass;
pub use pasv::Pasv;
pub use port::Port;
pub use pwd::Pwd;
pub use quit::Quit;
pub use retr::Retr;
pub use rnfr::Rnfr;
pub use rnto::Rnto;
pub use size::Size;
pub use stor::Stor;
pub use stub::{NotImplemented, Stub};
pub use syst::Syst;
pub use type_::Type;
pub use user::User;
