//! The `Command` enum: a parsed FTP verb plus its arguments, and the parser that
//! turns a raw command line into one.

use super::parse_error::ParseError;
use std::convert::TryFrom;
use std::path::PathBuf;

/// A protection level as set by `PROT`, used after `AUTH TLS`/`PBSZ`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ProtectionParam {
    Clear,
    Private,
}

/// One parsed FTP command, with its arguments already typed.
#[derive(Debug, Clone, Eq, PartialEq)]
#[allow(clippy::upper_case_acronyms)]
pub enum Command {
    User { username: String },
    Pass { password: String },
    Acct { account: String },
    Syst,
    Stat { path: Option<String> },
    Type,
    Stru { structure: char },
    Mode { mode: char },
    Help,
    Noop,
    Pasv,
    Port { addr: String },
    Eprt { addr: String },
    Epsv { net_prt: Option<String> },
    Retr { path: String },
    Stor { path: String },
    Appe { path: String },
    Stou,
    List { path: Option<String> },
    Nlst { path: Option<String> },
    Mlsd { path: Option<String> },
    Mlst { path: Option<String> },
    Feat,
    Pwd,
    Cwd { path: String },
    Cdup,
    Opts { option: String },
    Dele { path: String },
    Rmd { path: String },
    Mkd { path: String },
    Quit,
    Allo,
    Abor,
    Rnfr { file: String },
    Rnto { file: String },
    Auth { protocol: String },
    PBSZ,
    PROT { param: ProtectionParam },
    Size { file: String },
    Rest { offset: u64 },
    Mdtm { file: String },
    Site { args: String },
    Smnt { path: String },
    /// The Telnet `IAC IP IAC DM` interrupt sequence, spliced out of the byte stream
    /// ahead of line framing. Not a real FTP verb; carries no arguments.
    TelnetAbort,
}

impl TryFrom<&[u8]> for Command {
    type Error = ParseError;

    fn try_from(line: &[u8]) -> Result<Self, Self::Error> {
        if line.len() > 4096 {
            return Err(ParseError::LineTooLong);
        }
        let text = std::str::from_utf8(line).map_err(|_| ParseError::InvalidUtf8)?;
        let text = text.trim_end_matches(['\r', '\n']);
        let mut parts = text.splitn(2, ' ');
        let verb = parts.next().unwrap_or("").to_ascii_uppercase();
        let rest = parts.next().unwrap_or("").trim().to_string();

        let require_arg = |rest: &str| -> Result<String, ParseError> {
            if rest.is_empty() {
                Err(ParseError::InvalidCommand)
            } else {
                Ok(rest.to_string())
            }
        };

        Ok(match verb.as_str() {
            "USER" => Command::User { username: require_arg(&rest)? },
            "PASS" => Command::Pass { password: rest },
            "ACCT" => Command::Acct { account: rest },
            "SYST" => Command::Syst,
            "STAT" => Command::Stat { path: optional(&rest) },
            "TYPE" => Command::Type,
            "STRU" => Command::Stru {
                structure: rest.chars().next().unwrap_or('F'),
            },
            "MODE" => Command::Mode {
                mode: rest.chars().next().unwrap_or('S'),
            },
            "HELP" => Command::Help,
            "NOOP" => Command::Noop,
            "PASV" => Command::Pasv,
            "EPSV" => Command::Epsv { net_prt: optional(&rest) },
            "PORT" => Command::Port { addr: require_arg(&rest)? },
            "EPRT" => Command::Eprt { addr: require_arg(&rest)? },
            "RETR" => Command::Retr { path: require_arg(&rest)? },
            "STOR" => Command::Stor { path: require_arg(&rest)? },
            "APPE" => Command::Appe { path: require_arg(&rest)? },
            "STOU" => Command::Stou,
            "LIST" => Command::List { path: optional(&rest) },
            "NLST" => Command::Nlst { path: optional(&rest) },
            "MLSD" => Command::Mlsd { path: optional(&rest) },
            "MLST" => Command::Mlst { path: optional(&rest) },
            "FEAT" => Command::Feat,
            "PWD" | "XPWD" => Command::Pwd,
            "CWD" | "XCWD" => Command::Cwd { path: require_arg(&rest)? },
            "CDUP" | "XCUP" => Command::Cdup,
            "OPTS" => Command::Opts { option: rest },
            "DELE" => Command::Dele { path: require_arg(&rest)? },
            "RMD" | "XRMD" => Command::Rmd { path: require_arg(&rest)? },
            "MKD" | "XMKD" => Command::Mkd { path: require_arg(&rest)? },
            "QUIT" => Command::Quit,
            "ALLO" => Command::Allo,
            "ABOR" => Command::Abor,
            "RNFR" => Command::Rnfr { file: require_arg(&rest)? },
            "RNTO" => Command::Rnto { file: require_arg(&rest)? },
            "AUTH" => Command::Auth {
                protocol: rest.to_ascii_uppercase(),
            },
            "PBSZ" => Command::PBSZ,
            "PROT" => Command::PROT {
                param: match rest.to_ascii_uppercase().as_str() {
                    "P" => ProtectionParam::Private,
                    "C" => ProtectionParam::Clear,
                    _ => return Err(ParseError::InvalidToken { token: rest }),
                },
            },
            "SIZE" => Command::Size { file: require_arg(&rest)? },
            "REST" => Command::Rest {
                offset: rest.parse().map_err(|_| ParseError::InvalidToken { token: rest })?,
            },
            "MDTM" => Command::Mdtm { file: require_arg(&rest)? },
            "SITE" => Command::Site { args: rest },
            "SMNT" => Command::Smnt { path: require_arg(&rest)? },
            other => return Err(ParseError::UnknownCommand { command: other.to_string() }),
        })
    }
}

fn optional(rest: &str) -> Option<String> {
    if rest.is_empty() {
        None
    } else {
        Some(rest.to_string())
    }
}

/// Used by `RNFR`/`RNTO` handlers to stash the source path on the session.
pub type RenameFrom = PathBuf;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_user_and_pass() {
        assert_eq!(Command::try_from(b"USER anna".as_ref()).unwrap(), Command::User { username: "anna".into() });
        assert_eq!(Command::try_from(b"PASS hunter2".as_ref()).unwrap(), Command::Pass { password: "hunter2".into() });
    }

    #[test]
    fn user_without_argument_is_invalid() {
        assert_eq!(Command::try_from(b"USER".as_ref()).unwrap_err(), ParseError::InvalidCommand);
    }

    #[test]
    fn unknown_verb_is_reported() {
        match Command::try_from(b"BOGUS foo".as_ref()).unwrap_err() {
            ParseError::UnknownCommand { command } => assert_eq!(command, "BOGUS"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn rest_parses_numeric_offset() {
        assert_eq!(Command::try_from(b"REST 1024".as_ref()).unwrap(), Command::Rest { offset: 1024 });
    }
}
