//! Runs an FTP server from the command line.
//!
//! ```text
//! ftpd [host] [port] [root]
//! ```
//!
//! Defaults to `127.0.0.1 7002` and the current directory.

use libftpd::ServerBuilder;
use slog::{Drain, o};
use std::{env, path::PathBuf, process::ExitCode};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: &str = "7002";

#[tokio::main]
async fn main() -> ExitCode {
    let decorator = slog_term::TermDecorator::new().stderr().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let logger = slog::Logger::root(drain, o!());

    let mut args = env::args().skip(1);
    let host = args.next().unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = args.next().unwrap_or_else(|| DEFAULT_PORT.to_string());
    let root = match args.next().map(PathBuf::from).map_or_else(env::current_dir, Ok) {
        Ok(root) => root,
        Err(err) => {
            slog::crit!(logger, "Cannot determine the server root"; "error" => %err);
            return ExitCode::FAILURE;
        }
    };

    let server = ServerBuilder::new(root)
        .logger(logger.clone())
        .shutdown_indicator(async {
            // An error installing the handler leaves the server running until killed.
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
        })
        .build();
    let server = match server {
        Ok(server) => server,
        Err(err) => {
            slog::crit!(logger, "Cannot start server"; "error" => %err);
            return ExitCode::FAILURE;
        }
    };

    let addr = format!("{}:{}", host, port);
    slog::info!(logger, "Starting FTP server"; "addr" => &addr);
    match server.listen(addr).await {
        Ok(()) => {
            slog::info!(logger, "Server stopped");
            ExitCode::SUCCESS
        }
        Err(err) => {
            slog::crit!(logger, "Server failed"; "error" => %err);
            ExitCode::FAILURE
        }
    }
}
