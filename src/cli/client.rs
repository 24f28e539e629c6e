use tokio::net::UnixStream;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use crate::{Result, Context};
use crate::common::SOCKET_PATH;

const GREETING: &str = "OK RECLIGHT IPC";

pub struct IpcClient {
    socket_path: String,
}

impl IpcClient {
    pub fn new() -> Self {
        Self::with_path(SOCKET_PATH)
    }

    pub fn with_path(socket_path: impl Into<String>) -> Self {
        Self {
            socket_path: socket_path.into(),
        }
    }

    /// Sends one command and returns the daemon's reply without greeting or sign-off.
    pub async fn send(&self, command: &str) -> Result<String> {
        let mut stream = UnixStream::connect(&self.socket_path)
            .await
            .context("Daemon is not running")?;

        stream.write_all(command.as_bytes()).await?;
        stream.write_all(b"\nQUIT\n").await?;

        let mut response = String::new();
        stream.read_to_string(&mut response).await?;

        let body: Vec<&str> = response
            .lines()
            .filter(|l| *l != GREETING && *l != "BYE")
            .collect();
        Ok(body.join("\n").trim().to_string())
    }

    pub async fn ping(&self) -> Result<bool> {
        match self.send("PING").await {
            Ok(resp) => Ok(resp.contains("PONG")),
            Err(_) => Ok(false),
        }
    }
}

impl Default for IpcClient {
    fn default() -> Self {
        Self::new()
    }
}
