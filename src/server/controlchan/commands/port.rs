//! The RFC 959 Data Port (`PORT`) command
//
// The argument is a HOST-PORT specification for the data port
// to be used in data connection.  There are defaults for both
// the user and server data ports, and under normal
// circumstances this command and its reply are not needed.  If
// this command is used, the argument is the concatenation of a
// 32-bit internet host address and a 16-bit TCP port address.
// This address information is broken into 8-bit fields and the
// value of each field is transmitted as a decimal number (in
// character string representation).  The fields are separated
// by commas.  A port command would be:
//
//    PORT h1,h2,h3,h4,p1,p2
//
// where h1 is the high order 8 bits of the internet host
// address.

use crate::server::controlchan::{
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
    Reply, ReplyCode,
};
use async_trait::async_trait;
use std::net::{Ipv4Addr, SocketAddrV4};

#[derive(Debug)]
pub struct Port {
    addr: String,
}

impl Port {
    pub fn new(addr: String) -> Self {
        Port { addr }
    }
}

#[async_trait]
impl CommandHandler for Port {
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let Some(endpoint) = parse_host_port(&self.addr) else {
            return Ok(Reply::with_default_message(ReplyCode::ParameterSyntaxError));
        };
        slog::debug!(args.logger, "Active mode"; "endpoint" => %endpoint);
        let data = args.session.lock().await.data.clone();
        data.enter_active(endpoint.into()).await;
        Ok(Reply::new(ReplyCode::CommandOkay, "PORT command successful"))
    }
}

fn parse_host_port(spec: &str) -> Option<SocketAddrV4> {
    let fields = spec
        .split(',')
        .map(|field| field.trim().parse::<u8>())
        .collect::<Result<Vec<u8>, _>>()
        .ok()?;
    match fields[..] {
        [h1, h2, h3, h4, p1, p2] => Some(SocketAddrV4::new(Ipv4Addr::new(h1, h2, h3, h4), u16::from(p1) * 256 + u16::from(p2))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_host_and_port() {
        assert_eq!(parse_host_port("127,0,0,1,4,1"), Some("127.0.0.1:1025".parse().unwrap()));
        assert_eq!(parse_host_port(" 10,0,0,2,255,255 "), Some("10.0.0.2:65535".parse().unwrap()));
    }

    #[test]
    fn rejects_malformed_specs() {
        assert_eq!(parse_host_port(""), None);
        assert_eq!(parse_host_port("127,0,0,1,4"), None);
        assert_eq!(parse_host_port("127,0,0,1,4,1,7"), None);
        assert_eq!(parse_host_port("127,0,0,1,4,256"), None);
        assert_eq!(parse_host_port("a,b,c,d,e,f"), None);
    }
}
