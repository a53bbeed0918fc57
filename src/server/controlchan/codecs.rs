use super::{error::ControlChanError, line_parser, Reply};

use bytes::BytesMut;
use std::io::Write;
use tokio_util::codec::{Decoder, Encoder};

// FtpCodec implements tokio's `Decoder` and `Encoder` traits for the control channel, that we'll
// use to decode FTP commands and encode their responses.
//
// A line that fails to parse is handed out as an `Err` item rather than a decoder error so that the
// stream stays usable and the control loop can reply 502.
#[derive(Debug, Default)]
pub struct FtpCodec {
    // Stored index of the next index to examine for a '\n' character. This is used to optimize
    // searching. For example, if `decode` was called with `abc`, it would hold `3`, because that
    // is the next index to examine. The next time `decode` is called with `abcde\n`, we will only
    // look at `de\n` before returning.
    next_index: usize,
}

impl FtpCodec {
    pub fn new() -> Self {
        FtpCodec { next_index: 0 }
    }
}

impl Decoder for FtpCodec {
    type Item = line_parser::Result<super::command::Command>;
    type Error = ControlChanError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(newline_offset) = buf[self.next_index..].iter().position(|b| *b == b'\n') {
            let newline_index = newline_offset + self.next_index;
            let line = buf.split_to(newline_index + 1);
            self.next_index = 0;
            Ok(Some(line_parser::parse(line)))
        } else {
            self.next_index = buf.len();
            Ok(None)
        }
    }
}

impl Encoder<Reply> for FtpCodec {
    type Error = ControlChanError;

    // Here we encode the outgoing response
    fn encode(&mut self, reply: Reply, buf: &mut BytesMut) -> Result<(), Self::Error> {
        let mut buffer = vec![];
        match reply {
            Reply::None => {
                return Ok(());
            }
            Reply::CodeAndMsg { code, msg } => {
                if msg.is_empty() {
                    writeln!(buffer, "{}\r", code as u32)?;
                } else {
                    writeln!(buffer, "{} {}\r", code as u32, msg)?;
                }
            }
            Reply::MultiLine { code, mut lines } => {
                // Get the last line since it needs to be preceded by the response code.
                let last_line = lines.pop().unwrap_or_default();
                if lines.is_empty() {
                    writeln!(buffer, "{} {}\r", code as u32, last_line)?;
                } else {
                    write!(buffer, "{}-{}\r\n{} {}\r\n", code as u32, lines.join("\r\n"), code as u32, last_line)?;
                }
            }
        }
        buf.extend(&buffer);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::controlchan::{command::Command, ReplyCode};
    use pretty_assertions::assert_eq;

    fn encode(reply: Reply) -> String {
        let mut buf = BytesMut::new();
        FtpCodec::new().encode(reply, &mut buf).unwrap();
        String::from_utf8(buf.to_vec()).unwrap()
    }

    #[test]
    fn encodes_single_line() {
        assert_eq!(encode(Reply::new(ReplyCode::CommandOkay, "Type set to I")), "200 Type set to I\r\n");
    }

    #[test]
    fn encodes_multi_line() {
        let reply = Reply::new_multiline(ReplyCode::SystemStatus, ["Extensions supported", " SIZE", "End"]);
        assert_eq!(encode(reply), "211-Extensions supported\r\n SIZE\r\n211 End\r\n");
    }

    #[test]
    fn encodes_nothing_for_no_reply() {
        assert_eq!(encode(Reply::none()), "");
    }

    #[test]
    fn decodes_once_a_line_is_complete() {
        let mut codec = FtpCodec::new();
        let mut buf = BytesMut::from("SY");
        assert!(codec.decode(&mut buf).unwrap().is_none());
        buf.extend_from_slice(b"ST\r\nFOO");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(Ok(Command::Syst)));
        assert_eq!(&buf[..], b"FOO");
    }

    #[test]
    fn hands_out_parse_errors_as_items() {
        let mut codec = FtpCodec::new();
        let mut buf = BytesMut::from("FOOBAR\r\n");
        assert!(matches!(codec.decode(&mut buf), Ok(Some(Err(_)))));
    }
}
