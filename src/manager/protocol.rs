//! The manager control endpoint's line protocol: one command per line in, CRLF-
//! terminated responses out.

/// One parsed manager command.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ManagerCommand {
    Status,
    Start,
    Stop,
    Kill,
    Connections,
    LoggingOn,
    LoggingOff,
    LogOutput,
}

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum ManagerParseError {
    #[error("unknown command {0:?}")]
    UnknownCommand(String),
}

impl std::str::FromStr for ManagerCommand {
    type Err = ManagerParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let mut parts = line.splitn(2, ' ');
        let verb = parts.next().unwrap_or("").to_ascii_uppercase();
        let rest = parts.next().unwrap_or("").trim().to_ascii_uppercase();
        match verb.as_str() {
            "STATUS" => Ok(ManagerCommand::Status),
            "START" => Ok(ManagerCommand::Start),
            "STOP" => Ok(ManagerCommand::Stop),
            "KILL" => Ok(ManagerCommand::Kill),
            "CONNECTIONS" => Ok(ManagerCommand::Connections),
            "LOGGING" if rest == "ON" => Ok(ManagerCommand::LoggingOn),
            "LOGGING" if rest == "OFF" => Ok(ManagerCommand::LoggingOff),
            "LOGOUTPUT" => Ok(ManagerCommand::LogOutput),
            other => Err(ManagerParseError::UnknownCommand(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_table_command() {
        assert_eq!("STATUS".parse::<ManagerCommand>().unwrap(), ManagerCommand::Status);
        assert_eq!("logging on".parse::<ManagerCommand>().unwrap(), ManagerCommand::LoggingOn);
        assert_eq!("LOGGING OFF".parse::<ManagerCommand>().unwrap(), ManagerCommand::LoggingOff);
        assert_eq!("KILL".parse::<ManagerCommand>().unwrap(), ManagerCommand::Kill);
    }

    #[test]
    fn rejects_unknown_verbs() {
        assert!("BOGUS".parse::<ManagerCommand>().is_err());
    }
}
