//! Contains code pertaining to the FTP *control* channel

mod codecs;
mod command;
mod commands;
mod control_loop;
mod error;
mod handler;
mod line_parser;
mod reply;

pub(crate) use control_loop::{spawn as spawn_loop, Config as LoopConfig};
pub use reply::ReplyCode;
pub(crate) use reply::Reply;
