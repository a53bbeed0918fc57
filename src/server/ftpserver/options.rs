//! Contains code pertaining to the setup options that can be given to the
//! [`ServerBuilder`](crate::ServerBuilder)

use std::{net::Ipv4Addr, time::Duration};

/// The greeting sent to clients when they connect.
pub const DEFAULT_GREETING: &str = "FTP server (nodeftpd) ready";
/// Passive mode is on unless disabled.
pub const DEFAULT_PASSIVE_MODE: bool = true;
/// Advertise the address the client connected to.
pub const DEFAULT_PASSIVE_HOST: PassiveHost = PassiveHost::FromConnection;
/// `CWD` into a missing directory creates it.
pub const DEFAULT_AUTOCREATE_DIRECTORIES: bool = true;
/// How long a passive data connection may wait for its transfer command.
pub const DEFAULT_DATA_CONNECTION_GRACE: Duration = Duration::from_secs(5);
/// Retry binding a busy address 60 times, one second apart.
pub const DEFAULT_BIND_RETRY: BindRetry = BindRetry {
    attempts: 60,
    delay: Duration::from_secs(1),
};
/// Show everything up to debug messages.
pub const DEFAULT_VERBOSITY: u8 = 4;

/// The option to `ServerBuilder::passive_host`. It allows the user to specify how the IP address
/// communicated in the _PASV_ response is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PassiveHost {
    /// Use the IP address of the control connection
    #[default]
    FromConnection,
    /// Advertise this specific IP address
    Ip(Ipv4Addr),
}

impl From<Ipv4Addr> for PassiveHost {
    fn from(ip: Ipv4Addr) -> Self {
        PassiveHost::Ip(ip)
    }
}

impl From<[u8; 4]> for PassiveHost {
    fn from(ip: [u8; 4]) -> Self {
        PassiveHost::Ip(ip.into())
    }
}

/// The option to `ServerBuilder::bind_retry`. Decides how long the server keeps trying when the
/// listen address is still in use, e.g. by a previous instance that is shutting down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindRetry {
    /// The number of failed binds after which the server gives up.
    pub attempts: u32,
    /// The pause between attempts.
    pub delay: Duration,
}

impl Default for BindRetry {
    fn default() -> Self {
        DEFAULT_BIND_RETRY
    }
}

/// Maps a verbosity level to the most detailed log level that is still shown: `0` shows warnings
/// and errors, `1..=2` adds info, `3..=4` debug and `5` or more everything.
pub fn log_level(verbosity: u8) -> slog::Level {
    match verbosity {
        0 => slog::Level::Warning,
        1..=2 => slog::Level::Info,
        3..=4 => slog::Level::Debug,
        _ => slog::Level::Trace,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn verbosity_levels() {
        assert_eq!(log_level(0), slog::Level::Warning);
        assert_eq!(log_level(2), slog::Level::Info);
        assert_eq!(log_level(DEFAULT_VERBOSITY), slog::Level::Debug);
        assert_eq!(log_level(9), slog::Level::Trace);
    }

    #[test]
    fn passive_host_from_octets() {
        assert_eq!(PassiveHost::from([10, 0, 0, 1]), PassiveHost::Ip(Ipv4Addr::new(10, 0, 0, 1)));
    }
}
