use super::handlers::handle_client;
use crate::common::LogLevel;
use crate::core::access::AccessProber;
use crate::core::shell::ShellBackend;
use crate::daemon::control::Controller;
use anyhow::Result;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::sync::{Arc, RwLock};
use tokio::net::UnixListener;

pub struct IpcHandles<B> {
    pub controller: Arc<Controller<B>>,
    pub prober: Arc<AccessProber>,
    pub set_log_level: Arc<dyn Fn(LogLevel) + Send + Sync>,
    pub current_log_level: Arc<RwLock<LogLevel>>,
}

impl<B> Clone for IpcHandles<B> {
    fn clone(&self) -> Self {
        Self {
            controller: self.controller.clone(),
            prober: self.prober.clone(),
            set_log_level: self.set_log_level.clone(),
            current_log_level: self.current_log_level.clone(),
        }
    }
}

pub async fn start<P: AsRef<Path>, B: ShellBackend>(path: P, h: IpcHandles<B>) -> Result<()> {
    let path_ref = path.as_ref();
    let _ = std::fs::remove_file(path_ref);
    let listener = UnixListener::bind(path_ref)?;
    let _ = std::fs::set_permissions(path_ref, std::fs::Permissions::from_mode(0o660));
    tracing::debug!(target: "reclight::daemon", "IPC listening at {:?}", path_ref);

    loop {
        let (stream, _) = listener.accept().await?;
        let hc = h.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(stream, hc).await {
                tracing::warn!(target: "reclight::daemon", "client error: {:?}", e);
            }
        });
    }
}
