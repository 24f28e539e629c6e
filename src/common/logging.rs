use crate::common::LogLevel;
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*, reload};

pub type ReloadHandle = reload::Handle<EnvFilter, Registry>;

/// Installs the global subscriber; the returned handle swaps the level at runtime.
pub fn init(level: LogLevel) -> ReloadHandle {
    let base_filter = EnvFilter::new(level.to_string());
    let (filter_layer, filter_handle) = reload::Layer::new(base_filter);
    let timer = fmt::time::UtcTime::new(time::macros::format_description!(
        "[hour]:[minute]:[second]"
    ));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_timer(timer)
                .with_writer(std::io::stderr),
        )
        .init();

    filter_handle
}

pub fn set_level(handle: &ReloadHandle, level: LogLevel) {
    match handle.reload(EnvFilter::new(level.to_string())) {
        Ok(_) => tracing::debug!(target: "reclight::log", "Log level changed to {:?}", level),
        Err(e) => tracing::error!(target: "reclight::log", "Failed to change log level: {}", e),
    }
}
