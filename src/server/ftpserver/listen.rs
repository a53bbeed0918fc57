//! Contains the code that listens to control channel connections.

use super::{ServerError, options::BindRetry};
use crate::{notification::ServerObserver, server::controlchan};

use std::{future::Future, io, net::SocketAddr, pin::Pin, sync::Arc};
use tokio::net::TcpListener;

// Listener listens for control channel connections on a TCP port and spawns a control channel loop
// in a new task for each incoming connection.
pub(super) struct Listener {
    pub bind_address: SocketAddr,
    pub bind_retry: BindRetry,
    pub logger: slog::Logger,
    pub options: controlchan::LoopConfig,
    pub observer: Arc<dyn ServerObserver>,
    pub shutdown: Pin<Box<dyn Future<Output = ()> + Send>>,
}

impl Listener {
    pub async fn listen(self) -> Result<(), ServerError> {
        let Listener {
            bind_address,
            bind_retry,
            logger,
            options,
            observer,
            mut shutdown,
        } = self;
        let listener = bind_with_retry(bind_address, bind_retry, &logger).await?;
        let local_addr = listener.local_addr()?;
        slog::info!(logger, "Listening for control connections"; "addr" => %local_addr);
        observer.ready(local_addr).await;

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    slog::info!(logger, "Shutting down, no longer accepting control connections");
                    return Ok(());
                }
                accepted = listener.accept() => match accepted {
                    Ok((tcp_stream, socket_addr)) => {
                        slog::info!(logger, "Incoming control connection"; "peer" => %socket_addr);
                        let options = options.clone();
                        let logger = logger.clone();
                        tokio::spawn(async move {
                            if let Err(err) = controlchan::spawn_loop(options, tcp_stream).await {
                                slog::error!(logger, "Could not spawn control channel loop"; "peer" => %socket_addr, "error" => %err);
                            }
                        });
                    }
                    Err(err) => {
                        slog::error!(logger, "Error accepting incoming control connection"; "error" => %err);
                    }
                },
            }
        }
    }
}

// Binds `addr`, retrying while it is in use. Any other error ends the attempts right away.
pub(super) async fn bind_with_retry(addr: SocketAddr, retry: BindRetry, logger: &slog::Logger) -> Result<TcpListener, ServerError> {
    let mut attempts = 0;
    loop {
        attempts += 1;
        match TcpListener::bind(addr).await {
            Ok(listener) => return Ok(listener),
            Err(err) if err.kind() == io::ErrorKind::AddrInUse && attempts < retry.attempts => {
                slog::info!(logger, "Address in use, retrying"; "addr" => %addr, "attempt" => attempts);
                tokio::time::sleep(retry.delay).await;
            }
            Err(err) => return Err(ServerError::bind(addr, attempts, err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::ftpserver::error::ServerErrorKind;
    use pretty_assertions::assert_eq;
    use std::{net::Ipv4Addr, time::Duration};

    fn logger() -> slog::Logger {
        slog::Logger::root(slog::Discard, slog::o!())
    }

    #[tokio::test]
    async fn gives_up_when_address_stays_in_use() {
        let taken = std::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        let retry = BindRetry {
            attempts: 3,
            delay: Duration::from_millis(10),
        };
        let err = bind_with_retry(taken.local_addr().unwrap(), retry, &logger()).await.unwrap_err();
        assert_eq!(err.kind(), ServerErrorKind::BindRetriesExhausted);
    }

    #[tokio::test]
    async fn binds_once_the_address_is_released() {
        let taken = std::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        let addr = taken.local_addr().unwrap();
        let retry = BindRetry {
            attempts: 50,
            delay: Duration::from_millis(20),
        };
        let release = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            drop(taken);
        });
        let listener = bind_with_retry(addr, retry, &logger()).await.unwrap();
        assert_eq!(listener.local_addr().unwrap(), addr);
        release.await.unwrap();
    }
}
