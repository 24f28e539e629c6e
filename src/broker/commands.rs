use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokerCommand {
    Ping,
    Uid,
    RequestPermission,
    Exec(String),
    ExecCode(String),
    Destroy,
}

impl BrokerCommand {
    /// Commands an untrusted peer is allowed to send.
    pub fn is_public(&self) -> bool {
        matches!(self, Self::Ping | Self::Uid | Self::RequestPermission)
    }
}

fn decode_command(payload: &str) -> Result<String, &'static str> {
    serde_json::from_str::<String>(payload.trim()).map_err(|_| "payload must be a JSON string")
}

impl FromStr for BrokerCommand {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (verb, rest) = s.split_once(' ').unwrap_or((s, ""));
        match (verb.to_ascii_uppercase().as_str(), rest.is_empty()) {
            ("PING", true) => Ok(Self::Ping),
            ("UID", true) => Ok(Self::Uid),
            ("REQUEST_PERMISSION", true) => Ok(Self::RequestPermission),
            ("DESTROY", true) => Ok(Self::Destroy),
            ("EXEC", false) => decode_command(rest).map(Self::Exec),
            ("EXEC_CODE", false) => decode_command(rest).map(Self::ExecCode),
            ("EXEC" | "EXEC_CODE", true) => Err("usage: EXEC <json string>"),
            _ => Err("unknown command"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exec_payload_as_json() {
        let cmd: BrokerCommand = r#"EXEC "echo 1 > /sys/class/leds/red/brightness""#
            .parse()
            .unwrap();
        assert_eq!(
            cmd,
            BrokerCommand::Exec("echo 1 > /sys/class/leds/red/brightness".into())
        );

        let cmd: BrokerCommand = r#"EXEC_CODE "printf 'a\nb'""#.parse().unwrap();
        assert_eq!(cmd, BrokerCommand::ExecCode("printf 'a\nb'".into()));
    }

    #[test]
    fn rejects_raw_or_missing_payload() {
        assert!("EXEC id".parse::<BrokerCommand>().is_err());
        assert!("EXEC".parse::<BrokerCommand>().is_err());
        assert!("PING now".parse::<BrokerCommand>().is_err());
        assert!("SUDO id".parse::<BrokerCommand>().is_err());
    }

    #[test]
    fn only_handshake_commands_are_public() {
        assert!(BrokerCommand::Ping.is_public());
        assert!(BrokerCommand::RequestPermission.is_public());
        assert!(!BrokerCommand::Exec("id".into()).is_public());
        assert!(!BrokerCommand::Destroy.is_public());
    }
}
