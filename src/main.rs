use reclight::Result;
use reclight::common::logging;
use reclight::core::config;
use reclight::daemon::run::{self, DaemonConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let (settings, prefs) = config::load_all()?;
    let filter_handle = logging::init(settings.daemon.log_level);

    tracing::info!(
        "Reclight v{} started (mode={}, led={}, broker={})",
        env!("CARGO_PKG_VERSION"),
        prefs.mode(),
        settings.led.path,
        settings.broker.socket
    );

    let cfg = DaemonConfig::new(settings, prefs);
    run::run_with_config(cfg, filter_handle).await
}
