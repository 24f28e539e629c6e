use super::commands::Command;
use super::server::IpcHandles;
use crate::common::MAX_LINE_LEN;
use crate::common::line::{Line, discard_line, read_bounded_line};
use crate::core::shell::ShellBackend;
use anyhow::Result;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tracing::{debug, info};

const HELP: &str = "CMDS:
        - HELP | ?
        - STATUS
        - ON | OFF | TOGGLE
        - SET_MODE <STATIC|BLINK|BREATHE>
        - SET_BRIGHTNESS <0-255>
        - SET_SPEED <1-100>
        - GET_BRIGHTNESS
        - REQUEST_PERMISSION
        - SET_LOG <DEBUG|INFO|WARN|ERROR>
        - RELOAD
        - GET_PID
        - MARK_TILE_ADDED
        - PING
        - QUIT
 ";

fn switch_response(res: Result<bool>, light_on: bool) -> String {
    match res {
        Ok(true) => format!("OK {}\n", if light_on { "ON" } else { "OFF" }),
        Ok(false) => "ERR WRITE_FAILED\n".into(),
        Err(e) => format!("ERR {}\n", e),
    }
}

/// Handle a single IPC client connection.
pub async fn handle_client<B: ShellBackend>(stream: UnixStream, h: IpcHandles<B>) -> Result<()> {
    let (r, mut w) = stream.into_split();
    let mut reader = BufReader::new(r);
    w.write_all(b"OK RECLIGHT IPC\n").await?;

    let ctl = &h.controller;

    loop {
        let line = match read_bounded_line(&mut reader, MAX_LINE_LEN).await? {
            Line::Eof => break,
            Line::Text(line) => line,
            Line::TooLong => {
                discard_line(&mut reader).await?;
                w.write_all(b"ERR input too long\n").await?;
                continue;
            }
        };
        let s = line.trim();
        let resp = match s.parse::<Command>() {
            Ok(Command::Help) => HELP.to_string(),
            Ok(Command::Ping) => "PONG\n".into(),
            Ok(Command::Quit) => {
                w.write_all(b"BYE\n").await?;
                break;
            }
            Ok(Command::GetPid) => format!("PID={}\n", std::process::id()),
            Ok(Command::Status) => {
                let prefs = ctl.prefs();
                let mode = prefs.mode();
                let log_level = match h.current_log_level.read() {
                    Ok(l) => l.to_upper_str(),
                    Err(_) => "UNKNOWN",
                };
                format!(
                    "ACCESS={} LIGHT={} MODE={} BRIGHTNESS={} SPEED={} ANIMATING={} TILE={} LOG_LEVEL={}\n",
                    ctl.access().status().wire_str(),
                    if ctl.is_light_on() { "on" } else { "off" },
                    mode.to_upper_str(),
                    prefs.brightness_for(mode),
                    prefs.blink_speed,
                    ctl.led().is_animating(),
                    prefs.tile_added,
                    log_level
                )
            }
            Ok(Command::On) => {
                let res = ctl.turn_on().await;
                switch_response(res, ctl.is_light_on())
            }
            Ok(Command::Off) => {
                let res = ctl.turn_off().await;
                switch_response(res, ctl.is_light_on())
            }
            Ok(Command::Toggle) => {
                let res = ctl.toggle().await;
                switch_response(res, ctl.is_light_on())
            }
            Ok(Command::SetMode(mode)) => match ctl.set_mode(mode).await {
                Ok(()) => format!("OK SET_MODE {}\n", mode.to_upper_str()),
                Err(e) => format!("ERR SET_MODE {:#}\n", e),
            },
            Ok(Command::SetBrightness(value)) => match ctl.set_brightness(value).await {
                Ok(b) => format!("OK SET_BRIGHTNESS {}\n", b),
                Err(e) => format!("ERR SET_BRIGHTNESS {:#}\n", e),
            },
            Ok(Command::SetSpeed(value)) => match ctl.set_speed(value).await {
                Ok(s) => format!("OK SET_SPEED {}\n", s),
                Err(e) => format!("ERR SET_SPEED {:#}\n", e),
            },
            Ok(Command::GetBrightness) => {
                format!("BRIGHTNESS={}\n", ctl.current_brightness().await)
            }
            Ok(Command::RequestPermission) => {
                if h.prober.request_permission().await {
                    "OK REQUESTED\n".into()
                } else {
                    "ERR BROKER_UNAVAILABLE\n".into()
                }
            }
            Ok(Command::SetLog(lvl)) => {
                (h.set_log_level)(lvl);
                "OK SET_LOG\n".into()
            }
            Ok(Command::Reload) => match ctl.reload_prefs() {
                Ok(()) => {
                    info!(target: "reclight::ipc", "Prefs reloaded via IPC");
                    "OK RELOADED\n".into()
                }
                Err(e) => format!("ERR RELOAD {:#}\n", e),
            },
            Ok(Command::MarkTileAdded) => match ctl.mark_tile_added() {
                Ok(()) => "OK TILE_ADDED\n".into(),
                Err(e) => format!("ERR TILE_ADDED {:#}\n", e),
            },
            Err(e) => format!("ERR {}\n", e),
        };
        debug!(target: "reclight::ipc", "{} -> {}", s, resp.trim_end());
        w.write_all(resp.as_bytes()).await?;
    }
    Ok(())
}
