pub const SOCKET_PATH: &str = "/dev/socket/reclight.sock";
pub const BROKER_SOCKET_PATH: &str = "/dev/socket/reclight-broker.sock";
pub const CONFIG_DIR: &str = "/data/adb/.config/reclight";
pub const SETTINGS_FILE: &str = "settings.toml";
pub const PREFS_FILE: &str = "prefs.toml";
pub const LED_BRIGHTNESS_PATH: &str = "/sys/class/leds/red/brightness";

pub const MAX_BRIGHTNESS: u8 = 255;
pub const MAX_LINE_LEN: usize = 256;
