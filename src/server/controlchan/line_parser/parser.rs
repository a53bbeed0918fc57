use super::error::{ParseErrorKind, Result};
use crate::server::controlchan::command::{Command, Password};

use std::str;

/// Parse the given bytes into a [`Command`].
///
/// The line is trimmed, the leading word is the command (case-insensitive) and everything after at
/// most one whitespace character following it is the argument.
pub fn parse<T>(line: T) -> Result<Command>
where
    T: AsRef<[u8]>,
{
    let line = str::from_utf8(line.as_ref())?.trim();
    let (token, arg) = split_command(line).ok_or(ParseErrorKind::InvalidSyntax)?;
    let cmd_token = token.to_ascii_uppercase();
    let arg = arg.to_string();

    let cmd = match cmd_token.as_str() {
        "USER" => Command::User { username: arg },
        "PASS" => Command::Pass {
            password: Password::new(arg),
        },
        "SYST" => Command::Syst,
        "FEAT" => Command::Feat,
        "PWD" | "XPWD" => Command::Pwd,
        "CWD" => Command::Cwd { path: arg },
        "CDUP" => Command::Cdup,
        "TYPE" => Command::Type { param: arg },
        "PASV" => Command::Pasv,
        "PORT" => Command::Port { addr: arg },
        "LIST" => {
            let path = if arg.is_empty() { None } else { Some(arg) };
            Command::List { path }
        }
        "RETR" => Command::Retr { path: arg },
        "STOR" => Command::Stor { path: arg },
        "MKD" => Command::Mkd { path: arg },
        "DELE" => Command::Dele { path: arg },
        "RNFR" => Command::Rnfr { file: arg },
        "RNTO" => Command::Rnto { file: arg },
        "SIZE" => Command::Size { file: arg },
        "QUIT" => Command::Quit,
        "ABOR" | "ACCT" | "ADAT" | "ALLO" | "AUTH" | "CCC" | "CONF" | "ENC" | "EPRT" | "EPSV" | "HELP" | "LANG" | "LPRT" | "LPSV" | "MDTM" | "MIC"
        | "MLSD" | "MLST" | "MODE" | "NOOP" | "OPTS" | "REIN" | "STOU" | "STRU" | "PBSZ" | "SITE" | "SMNT" | "NLST" | "REST" => {
            Command::Stub { command: cmd_token }
        }
        "APPE" | "RMD" | "STAT" => Command::NotImplemented { command: cmd_token },
        _ => return Err(ParseErrorKind::UnknownCommand { command: cmd_token }.into()),
    };

    Ok(cmd)
}

// Splits `line` into its leading word and the argument following at most one whitespace
// character. Returns `None` when the line does not start with a word character.
fn split_command(line: &str) -> Option<(&str, &str)> {
    let end = line.find(|c: char| !is_word_char(c)).unwrap_or(line.len());
    if end == 0 {
        return None;
    }
    let (token, rest) = line.split_at(end);
    let mut chars = rest.chars();
    let arg = match chars.next() {
        Some(c) if c.is_whitespace() => chars.as_str(),
        _ => rest,
    };
    Some((token, arg))
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
