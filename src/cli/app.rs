use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "reclightctl")]
#[command(version, about = "Recording light control CLI")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
    #[arg(short, long, global = true)]
    pub socket: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    Status,
    On,
    Off,
    /// Flip the light, like the quick-settings tile does
    Toggle,

    Mode {
        #[arg(value_enum)]
        mode: LightMode,
    },

    /// Brightness for the active mode
    Brightness {
        value: u8,
    },

    /// Blink speed, 1 (slow) to 100 (fast)
    Speed {
        #[arg(value_parser = clap::value_parser!(u8).range(1..=100))]
        value: u8,
    },

    GetBrightness,
    RequestPermission,

    SetLog {
        #[arg(value_enum)]
        level: LogLevel,
    },

    Reload,
    GetPid,
    Ping,
    TileAdded,
}

#[derive(Clone, ValueEnum)]
pub enum LightMode {
    Static,
    Blink,
    Breathe,
}

impl LightMode {
    pub fn to_upper_str(&self) -> &'static str {
        match self {
            Self::Static => "STATIC",
            Self::Blink => "BLINK",
            Self::Breathe => "BREATHE",
        }
    }
}

#[derive(Clone, ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn to_upper_str(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}
