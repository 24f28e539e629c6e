use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LightMode {
    #[default]
    Static,
    Blink,
    Breathe,
}

impl LightMode {
    pub const ALL: [Self; 3] = [Self::Static, Self::Blink, Self::Breathe];

    pub fn from_str_ignore_case(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "STATIC" => Some(Self::Static),
            "BLINK" => Some(Self::Blink),
            "BREATHE" => Some(Self::Breathe),
            _ => None,
        }
    }

    pub fn to_upper_str(&self) -> &'static str {
        match self {
            Self::Static => "STATIC",
            Self::Blink => "BLINK",
            Self::Breathe => "BREATHE",
        }
    }
}

impl std::fmt::Display for LightMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static => write!(f, "static"),
            Self::Blink => write!(f, "blink"),
            Self::Breathe => write!(f, "breathe"),
        }
    }
}

/// How (and whether) privileged commands can currently be run.
///
/// Derived on every status poll, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessStatus {
    #[default]
    Checking,
    /// Broker service is reachable and trusts us.
    Ready,
    /// Broker is running but our uid is not in its allow list.
    PermissionRequired,
    NotRunning,
    /// Neither root nor a working broker.
    NotInstalled,
    UsingRootDirectly,
}

impl AccessStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready | Self::UsingRootDirectly)
    }

    pub fn wire_str(&self) -> &'static str {
        match self {
            Self::Checking => "CHECKING",
            Self::Ready => "READY",
            Self::PermissionRequired => "PERMISSION_REQUIRED",
            Self::NotRunning => "NOT_RUNNING",
            Self::NotInstalled => "NOT_INSTALLED",
            Self::UsingRootDirectly => "ROOT",
        }
    }

    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "CHECKING" => Some(Self::Checking),
            "READY" => Some(Self::Ready),
            "PERMISSION_REQUIRED" => Some(Self::PermissionRequired),
            "NOT_RUNNING" => Some(Self::NotRunning),
            "NOT_INSTALLED" => Some(Self::NotInstalled),
            "ROOT" => Some(Self::UsingRootDirectly),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Checking => "Checking...",
            Self::Ready => "Ready",
            Self::PermissionRequired => "Permission Required",
            Self::NotRunning => "Not Running",
            Self::NotInstalled => "Not Available",
            Self::UsingRootDirectly => "Root Ready",
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            Self::Checking => "Probing root and broker",
            Self::Ready => "Broker service connected",
            Self::PermissionRequired => "Run `reclightctl request-permission`",
            Self::NotRunning => "Start reclight-broker",
            Self::NotInstalled => "Root or broker service required",
            Self::UsingRootDirectly => "Direct su root",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn from_str_ignore_case(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    pub fn to_upper_str(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn light_mode_parses_any_case() {
        assert_eq!(LightMode::from_str_ignore_case("blink"), Some(LightMode::Blink));
        assert_eq!(LightMode::from_str_ignore_case("BREATHE"), Some(LightMode::Breathe));
        assert_eq!(LightMode::from_str_ignore_case(" Static "), Some(LightMode::Static));
        assert_eq!(LightMode::from_str_ignore_case("strobe"), None);
    }

    #[test]
    fn access_status_wire_names_round_trip() {
        for status in [
            AccessStatus::Checking,
            AccessStatus::Ready,
            AccessStatus::PermissionRequired,
            AccessStatus::NotRunning,
            AccessStatus::NotInstalled,
            AccessStatus::UsingRootDirectly,
        ] {
            assert_eq!(AccessStatus::from_wire(status.wire_str()), Some(status));
        }
    }

    #[test]
    fn only_root_and_broker_are_ready() {
        assert!(AccessStatus::Ready.is_ready());
        assert!(AccessStatus::UsingRootDirectly.is_ready());
        assert!(!AccessStatus::Checking.is_ready());
        assert!(!AccessStatus::PermissionRequired.is_ready());
        assert!(!AccessStatus::NotRunning.is_ready());
        assert!(!AccessStatus::NotInstalled.is_ready());
    }
}
