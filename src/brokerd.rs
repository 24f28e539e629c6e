use clap::Parser;
use reclight::Result;
use reclight::broker::BrokerServer;
use reclight::common::logging;
use reclight::core::config::{self, Settings};

#[derive(Parser)]
#[command(name = "reclight-broker")]
#[command(version, about = "Privileged command broker for the recording light")]
struct Args {
    /// Socket to listen on (defaults to settings.toml)
    #[arg(short, long)]
    socket: Option<String>,

    /// Uid allowed to execute commands; repeatable
    #[arg(long = "allow", value_name = "UID")]
    allow: Vec<u32>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let settings = Settings::load(config::settings_path())?;
    let _filter_handle = logging::init(settings.daemon.log_level);

    let socket = args.socket.unwrap_or(settings.broker.socket);
    let uids = if args.allow.is_empty() {
        settings.broker.allowed_uids
    } else {
        args.allow
    };

    tracing::info!(
        "Reclight broker v{} started (socket={}, uids={:?})",
        env!("CARGO_PKG_VERSION"),
        socket,
        uids
    );

    BrokerServer::new(uids).serve(&socket).await
}
