use crate::common::{LightMode, LogLevel};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Status,
    On,
    Off,
    Toggle,
    SetMode(LightMode),
    SetBrightness(f32),
    SetSpeed(f32),
    GetBrightness,
    RequestPermission,
    SetLog(LogLevel),
    Reload,
    GetPid,
    MarkTileAdded,
    Ping,
    Quit,
}

fn parse_in_range(raw: &str, min: f32, max: f32) -> Option<f32> {
    raw.parse::<f32>()
        .ok()
        .filter(|v| v.is_finite() && (min..=max).contains(v))
}

impl FromStr for Command {
    type Err = &'static str;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        let Some((verb, args)) = parts.split_first() else {
            return Err("empty");
        };
        match (verb.to_ascii_uppercase().as_str(), args) {
            ("HELP" | "?", []) => Ok(Command::Help),
            ("STATUS", []) => Ok(Command::Status),
            ("ON", []) => Ok(Command::On),
            ("OFF", []) => Ok(Command::Off),
            ("TOGGLE", []) => Ok(Command::Toggle),
            ("GET_BRIGHTNESS" | "GETBRIGHTNESS", []) => Ok(Command::GetBrightness),
            ("REQUEST_PERMISSION", []) => Ok(Command::RequestPermission),
            ("RELOAD", []) => Ok(Command::Reload),
            ("GET_PID" | "GETPID", []) => Ok(Command::GetPid),
            ("MARK_TILE_ADDED", []) => Ok(Command::MarkTileAdded),
            ("PING", []) => Ok(Command::Ping),
            ("QUIT", []) => Ok(Command::Quit),

            ("SET_MODE" | "SETMODE", [mode]) => LightMode::from_str_ignore_case(mode)
                .map(Command::SetMode)
                .ok_or("usage: SET_MODE <STATIC|BLINK|BREATHE>"),

            ("SET_BRIGHTNESS" | "SETBRIGHTNESS", [value]) => parse_in_range(value, 0.0, 255.0)
                .map(Command::SetBrightness)
                .ok_or("usage: SET_BRIGHTNESS <0-255>"),

            ("SET_SPEED" | "SETSPEED", [value]) => parse_in_range(value, 1.0, 100.0)
                .map(Command::SetSpeed)
                .ok_or("usage: SET_SPEED <1-100>"),

            ("SET_LOG" | "SETLOG", [level]) => LogLevel::from_str_ignore_case(level)
                .map(Command::SetLog)
                .ok_or("usage: SET_LOG <DEBUG|INFO|WARN|ERROR>"),

            _ => Err("unknown command (try HELP)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_verbs_case_insensitively() {
        assert_eq!("toggle".parse::<Command>(), Ok(Command::Toggle));
        assert_eq!("STATUS".parse::<Command>(), Ok(Command::Status));
        assert_eq!("?".parse::<Command>(), Ok(Command::Help));
        assert_eq!("GETPID".parse::<Command>(), Ok(Command::GetPid));
    }

    #[test]
    fn parses_arguments() {
        assert_eq!("SET_MODE breathe".parse::<Command>(), Ok(Command::SetMode(LightMode::Breathe)));
        assert_eq!("SET_BRIGHTNESS 128".parse::<Command>(), Ok(Command::SetBrightness(128.0)));
        assert_eq!("SET_SPEED 1".parse::<Command>(), Ok(Command::SetSpeed(1.0)));
        assert_eq!("SET_LOG DEBUG".parse::<Command>(), Ok(Command::SetLog(LogLevel::Debug)));
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!("SET_BRIGHTNESS 256".parse::<Command>().is_err());
        assert!("SET_BRIGHTNESS -1".parse::<Command>().is_err());
        assert!("SET_SPEED 0".parse::<Command>().is_err());
        assert!("SET_SPEED NaN".parse::<Command>().is_err());
        assert!("SET_MODE strobe".parse::<Command>().is_err());
    }

    #[test]
    fn rejects_wrong_arity() {
        assert!("".parse::<Command>().is_err());
        assert!("ON now".parse::<Command>().is_err());
        assert!("SET_MODE".parse::<Command>().is_err());
    }
}
