use super::commands::BrokerCommand;
use super::exec;
use crate::core::shell::{GREETING_DENIED, GREETING_GRANTED};
use anyhow::Result;
use std::collections::HashSet;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::sync::Arc;
use crate::common::line::{Line, read_bounded_line};
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Notify;
use tracing::{debug, info, warn};

const MAX_REQUEST_LEN: usize = 64 * 1024;

#[derive(Clone)]
pub struct BrokerServer {
    allowed_uids: Arc<HashSet<u32>>,
    shutdown: Arc<Notify>,
}

impl BrokerServer {
    pub fn new(allowed_uids: impl IntoIterator<Item = u32>) -> Self {
        Self {
            allowed_uids: Arc::new(allowed_uids.into_iter().collect()),
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Accepts peers until one of them sends `DESTROY`.
    pub async fn serve<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path_ref = path.as_ref();
        let _ = std::fs::remove_file(path_ref);
        let listener = UnixListener::bind(path_ref)?;
        let _ = std::fs::set_permissions(path_ref, std::fs::Permissions::from_mode(0o666));
        info!(
            target: "reclight::broker",
            "Broker listening at {:?} (allowed uids: {:?})",
            path_ref,
            self.allowed_uids
        );

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, _) = accepted?;
                    let server = self.clone();
                    tokio::spawn(async move {
                        if let Err(e) = server.handle_client(stream).await {
                            warn!(target: "reclight::broker", "client error: {:?}", e);
                        }
                    });
                }
                _ = self.shutdown.notified() => {
                    info!(target: "reclight::broker", "Service destroy called");
                    break;
                }
            }
        }

        let _ = std::fs::remove_file(path_ref);
        Ok(())
    }

    async fn handle_client(&self, stream: UnixStream) -> Result<()> {
        let peer_uid = stream.peer_cred().ok().map(|c| c.uid());
        let allowed = peer_uid.is_some_and(|uid| self.allowed_uids.contains(&uid));
        debug!(target: "reclight::broker", "Peer uid={:?} allowed={}", peer_uid, allowed);

        let (r, mut w) = stream.into_split();
        let mut reader = BufReader::new(r);

        let greeting = if allowed { GREETING_GRANTED } else { GREETING_DENIED };
        w.write_all(format!("{}\n", greeting).as_bytes()).await?;

        loop {
            let line = match read_bounded_line(&mut reader, MAX_REQUEST_LEN).await? {
                Line::Eof => break,
                Line::Text(line) => line,
                Line::TooLong => {
                    warn!(target: "reclight::broker", "Dropping peer uid={:?}: request too long", peer_uid);
                    w.write_all(b"ERR input too long\n").await?;
                    break;
                }
            };

            let resp = match line.parse::<BrokerCommand>() {
                Ok(cmd) if !allowed && !cmd.is_public() => "ERR DENIED\n".to_string(),
                Ok(BrokerCommand::Ping) => "PONG\n".into(),
                Ok(BrokerCommand::Uid) => {
                    let uid = unsafe { libc::getuid() };
                    format!("{}\n", uid)
                }
                Ok(BrokerCommand::RequestPermission) => {
                    match peer_uid {
                        Some(uid) if allowed => debug!(target: "reclight::broker", "uid {} already allowed", uid),
                        Some(uid) => warn!(
                            target: "reclight::broker",
                            "uid {} requests access; add it to broker.allowed_uids to grant",
                            uid
                        ),
                        None => warn!(target: "reclight::broker", "Permission request from unknown peer"),
                    }
                    if allowed {
                        "OK GRANTED\n".into()
                    } else {
                        "OK REQUESTED\n".into()
                    }
                }
                Ok(BrokerCommand::Exec(command)) => {
                    let output = exec::exec(&command).await;
                    format!("{}\n", serde_json::to_string(&output)?)
                }
                Ok(BrokerCommand::ExecCode(command)) => {
                    format!("{}\n", exec::exec_exit_code(&command).await)
                }
                Ok(BrokerCommand::Destroy) => {
                    w.write_all(b"BYE\n").await?;
                    self.shutdown.notify_one();
                    break;
                }
                Err(e) => format!("ERR {}\n", e),
            };
            w.write_all(resp.as_bytes()).await?;
        }
        Ok(())
    }
}
