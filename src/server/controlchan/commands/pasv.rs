//! The RFC 959 Passive (`PASV`) command
//
// This command requests the server-DTP to "listen" on a data
// port (which is not its default data port) and to wait for a
// connection rather than initiate one upon receipt of a
// transfer command.  The response to this command includes the
// host and port address this server is listening on.

use crate::server::{
    controlchan::{
        error::ControlChanError,
        handler::{CommandContext, CommandHandler},
        Reply, ReplyCode,
    },
    ftpserver::options::PassiveHost,
};
use async_trait::async_trait;
use std::net::{IpAddr, Ipv4Addr};

#[derive(Debug)]
pub struct Pasv;

impl Pasv {
    // The IPv4 address the client is told to connect to.
    fn advertised_ip(passive_host: PassiveHost, local_ip: IpAddr) -> Option<Ipv4Addr> {
        match (passive_host, local_ip) {
            (PassiveHost::Ip(ip), _) => Some(ip),
            (PassiveHost::FromConnection, IpAddr::V4(ip)) => Some(ip),
            (PassiveHost::FromConnection, IpAddr::V6(ip)) => ip.to_ipv4_mapped(),
        }
    }
}

#[async_trait]
impl CommandHandler for Pasv {
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        if !args.passive_mode {
            return Ok(Reply::new(ReplyCode::CommandSyntaxError, "Passive mode not supported"));
        }
        let Some(ip) = Pasv::advertised_ip(args.passive_host, args.local_addr.ip()) else {
            slog::warn!(args.logger, "PASV needs an IPv4 address to advertise"; "local" => %args.local_addr);
            return Ok(Reply::with_default_message(ReplyCode::CantOpenDataConnection));
        };

        let data = args.session.lock().await.data.clone();
        let listening = match data.enter_passive(args.local_addr.ip()).await {
            Ok(addr) => addr,
            Err(err) => {
                slog::warn!(args.logger, "Could not listen for passive data connection"; "error" => %err);
                return Ok(Reply::with_default_message(ReplyCode::CantOpenDataConnection));
            }
        };
        slog::debug!(args.logger, "Listening for passive data connection"; "addr" => %listening);

        Ok(Reply::new_with_string(
            ReplyCode::EnteringPassiveMode,
            format!("PASV OK ({})", encode_host_port(ip, listening.port())),
        ))
    }
}

// The `h1,h2,h3,h4,p1,p2` form of RFC 959
fn encode_host_port(ip: Ipv4Addr, port: u16) -> String {
    let [h1, h2, h3, h4] = ip.octets();
    format!("{},{},{},{},{},{}", h1, h2, h3, h4, port >> 8, port & 0xff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::net::Ipv6Addr;

    #[test]
    fn encodes_address_and_port() {
        assert_eq!(encode_host_port(Ipv4Addr::new(127, 0, 0, 1), 1025), "127,0,0,1,4,1");
        assert_eq!(encode_host_port(Ipv4Addr::new(10, 1, 2, 3), 65535), "10,1,2,3,255,255");
        assert_eq!(encode_host_port(Ipv4Addr::new(192, 168, 0, 9), 255), "192,168,0,9,0,255");
    }

    #[test]
    fn advertises_configured_ip() {
        let ip = Pasv::advertised_ip(PassiveHost::Ip(Ipv4Addr::new(1, 2, 3, 4)), Ipv4Addr::LOCALHOST.into());
        assert_eq!(ip, Some(Ipv4Addr::new(1, 2, 3, 4)));
    }

    #[test]
    fn advertises_mapped_ipv6_connections_only() {
        let mapped = Ipv4Addr::new(10, 0, 0, 1).to_ipv6_mapped();
        assert_eq!(Pasv::advertised_ip(PassiveHost::FromConnection, mapped.into()), Some(Ipv4Addr::new(10, 0, 0, 1)));
        assert_eq!(Pasv::advertised_ip(PassiveHost::FromConnection, Ipv6Addr::LOCALHOST.into()), None);
    }
}
