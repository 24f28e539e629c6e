use super::ShellResult;
use anyhow::{Context, Result, bail};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

pub const GREETING_GRANTED: &str = "OK RECLIGHT BROKER";
pub const GREETING_DENIED: &str = "DENIED";

/// Outcome of a one-shot handshake with the broker socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokerProbe {
    Granted,
    Denied,
    NotRunning,
    Unavailable(String),
}

struct Connection {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Connection {
    async fn open(path: &Path) -> std::io::Result<(Self, String)> {
        let stream = UnixStream::connect(path).await?;
        let (r, w) = stream.into_split();
        let mut conn = Self {
            reader: BufReader::new(r),
            writer: w,
        };
        let greeting = conn.read_line().await?;
        Ok((conn, greeting))
    }

    async fn read_line(&mut self) -> std::io::Result<String> {
        let mut line = String::new();
        if self.reader.read_line(&mut line).await? == 0 {
            return Err(std::io::Error::new(
                ErrorKind::UnexpectedEof,
                "broker closed the connection",
            ));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    async fn request(&mut self, line: &str) -> Result<String> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(self.read_line().await?)
    }
}

/// Client side of the broker service.
///
/// A bound connection is kept and reused; it is dropped on any transport
/// error (or when a request is cancelled midway) so the next call rebinds.
pub struct BrokerClient {
    socket_path: PathBuf,
    bind_timeout: Duration,
    conn: Mutex<Option<Connection>>,
}

impl BrokerClient {
    pub fn new(socket_path: impl Into<PathBuf>, bind_timeout: Duration) -> Self {
        Self {
            socket_path: socket_path.into(),
            bind_timeout,
            conn: Mutex::new(None),
        }
    }

    pub async fn probe(&self) -> BrokerProbe {
        let opened =
            tokio::time::timeout(self.bind_timeout, Connection::open(&self.socket_path)).await;
        match opened {
            Err(_) => BrokerProbe::Unavailable("handshake timed out".into()),
            Ok(Err(e)) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::ConnectionRefused) => {
                BrokerProbe::NotRunning
            }
            Ok(Err(e)) => BrokerProbe::Unavailable(e.to_string()),
            Ok(Ok((_, greeting))) if greeting == GREETING_GRANTED => BrokerProbe::Granted,
            Ok(Ok((_, greeting))) if greeting == GREETING_DENIED => BrokerProbe::Denied,
            Ok(Ok((_, greeting))) => BrokerProbe::Unavailable(format!("unexpected greeting: {}", greeting)),
        }
    }

    async fn connect(&self) -> Result<Connection> {
        let (conn, greeting) =
            tokio::time::timeout(self.bind_timeout, Connection::open(&self.socket_path))
                .await
                .context("Broker bind timed out")?
                .with_context(|| format!("Failed to connect to {}", self.socket_path.display()))?;

        if greeting != GREETING_GRANTED {
            bail!("Broker refused connection: {}", greeting);
        }
        Ok(conn)
    }

    /// Binds if not already bound. Returns whether a connection is available.
    pub async fn bind(&self) -> bool {
        let mut guard = self.conn.lock().await;
        if guard.is_some() {
            return true;
        }
        debug!(target: "reclight::broker", "Binding to broker at {}", self.socket_path.display());
        match self.connect().await {
            Ok(conn) => {
                info!(target: "reclight::broker", "Broker connected");
                *guard = Some(conn);
                true
            }
            Err(e) => {
                warn!(target: "reclight::broker", "Failed to bind broker: {:#}", e);
                false
            }
        }
    }

    pub async fn unbind(&self) {
        if self.conn.lock().await.take().is_some() {
            debug!(target: "reclight::broker", "Broker disconnected");
        }
    }

    pub async fn is_bound(&self) -> bool {
        self.conn.lock().await.is_some()
    }

    async fn request(&self, line: &str) -> Option<String> {
        let mut guard = self.conn.lock().await;
        let mut conn = match guard.take() {
            Some(conn) => conn,
            None => {
                debug!(target: "reclight::broker", "Broker not bound, attempting to bind...");
                match self.connect().await {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(target: "reclight::broker", "Failed to connect to broker: {:#}", e);
                        return None;
                    }
                }
            }
        };

        match conn.request(line).await {
            Ok(resp) => {
                *guard = Some(conn);
                Some(resp)
            }
            Err(e) => {
                error!(target: "reclight::broker", "Broker request failed: {:#}", e);
                None
            }
        }
    }

    /// Runs `command` through the broker; `None` means the caller should fall back.
    pub async fn exec(&self, command: &str) -> Option<ShellResult> {
        let payload = serde_json::to_string(command).ok()?;
        let resp = self.request(&format!("EXEC {}", payload)).await?;
        match serde_json::from_str::<String>(&resp) {
            Ok(output) => Some(ShellResult::from_broker_output(output)),
            Err(e) => {
                error!(target: "reclight::broker", "Malformed broker reply {:?}: {}", resp, e);
                self.unbind().await;
                None
            }
        }
    }

    pub async fn exec_exit_code(&self, command: &str) -> Option<i32> {
        let payload = serde_json::to_string(command).ok()?;
        let resp = self.request(&format!("EXEC_CODE {}", payload)).await?;
        resp.trim().parse().ok()
    }

    /// Uid the broker runs as (0 = root, 2000 = adb shell), -1 if unknown.
    pub async fn uid(&self) -> i32 {
        match self.oneshot("UID").await {
            Ok(resp) => resp.trim().parse().unwrap_or(-1),
            Err(e) => {
                debug!(target: "reclight::broker", "UID query failed: {:#}", e);
                -1
            }
        }
    }

    pub async fn request_permission(&self) -> Result<String> {
        self.oneshot("REQUEST_PERMISSION").await
    }

    /// Short-lived connection for commands any peer may send, granted or not.
    async fn oneshot(&self, line: &str) -> Result<String> {
        let (mut conn, _) =
            tokio::time::timeout(self.bind_timeout, Connection::open(&self.socket_path))
                .await
                .context("Broker bind timed out")??;
        conn.request(line).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_socket_is_not_running() {
        let dir = tempfile::tempdir().unwrap();
        let client = BrokerClient::new(dir.path().join("broker.sock"), Duration::from_millis(500));

        assert_eq!(client.probe().await, BrokerProbe::NotRunning);
        assert!(!client.bind().await);
        assert!(client.exec("id").await.is_none());
        assert_eq!(client.uid().await, -1);
    }

    #[tokio::test]
    async fn unexpected_greeting_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broker.sock");
        let listener = tokio::net::UnixListener::bind(&path).unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            stream.write_all(b"HELLO\n").await.unwrap();
        });

        let client = BrokerClient::new(&path, Duration::from_secs(1));
        assert!(matches!(client.probe().await, BrokerProbe::Unavailable(_)));
    }
}
