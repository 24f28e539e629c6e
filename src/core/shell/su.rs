use super::ShellResult;
use crate::core::cmd;
use anyhow::{Context, Result};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, error};

const ROOT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Direct root shell (KernelSU / Magisk / APatch `su`).
#[derive(Debug, Clone)]
pub struct SuShell {
    program: String,
}

impl SuShell {
    pub fn new() -> Self {
        Self::with_program("su")
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub async fn exec(&self, command: &str) -> ShellResult {
        debug!(target: "reclight::shell", "Executing via {}", self.program);
        match self.run(command).await {
            Ok(result) => {
                if result.success {
                    debug!(target: "reclight::shell", "su command succeeded: {}", result.output.trim());
                } else {
                    error!(
                        target: "reclight::shell",
                        "su command failed with exit code {}: {}",
                        result.exit_code,
                        result.error.trim()
                    );
                }
                result
            }
            Err(e) => {
                error!(target: "reclight::shell", "su execution failed: {:#}", e);
                ShellResult::failed(format!("{:#}", e))
            }
        }
    }

    async fn run(&self, command: &str) -> Result<ShellResult> {
        let mut child = Command::new(&self.program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn {}", self.program))?;

        let mut stdin = child.stdin.take().context("Shell stdin unavailable")?;
        stdin.write_all(format!("{}\nexit\n", command).as_bytes()).await?;
        stdin.flush().await?;
        drop(stdin);

        let output = child
            .wait_with_output()
            .await
            .context("Failed to wait for shell")?;

        Ok(ShellResult::from_exit(
            String::from_utf8_lossy(&output.stdout).into_owned(),
            String::from_utf8_lossy(&output.stderr).into_owned(),
            output.status.code().unwrap_or(-1),
        ))
    }

    /// True when `su -c id` reports uid 0.
    pub async fn probe_root(&self) -> bool {
        match cmd::run_cmd_timeout(&self.program, &["-c", "id"], ROOT_PROBE_TIMEOUT).await {
            Ok(out) => {
                let stdout = String::from_utf8_lossy(&out.stdout);
                let has_root = out.status.success() && cmd::is_root_id(&stdout);
                debug!(
                    target: "reclight::access",
                    "Direct root check: exitCode={:?}, hasRoot={}",
                    out.status.code(),
                    has_root
                );
                has_root
            }
            Err(e) => {
                debug!(target: "reclight::access", "Direct root not available: {:#}", e);
                false
            }
        }
    }
}

impl Default for SuShell {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn fake_su(dir: &std::path::Path, id_line: &str) -> String {
        let path = dir.join("su");
        std::fs::write(&path, format!("#!/bin/sh\necho '{}'\n", id_line)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[tokio::test]
    async fn captures_stdout_and_exit_code() {
        let shell = SuShell::with_program("sh");

        let ok = shell.exec("echo 42").await;
        assert!(ok.success);
        assert_eq!(ok.output, "42\n");

        let failed = shell.exec("echo oops >&2; exit 3").await;
        assert!(!failed.success);
        assert_eq!(failed.exit_code, 3);
        assert_eq!(failed.error.trim(), "oops");
    }

    #[tokio::test]
    async fn missing_binary_degrades_to_failed_result() {
        let shell = SuShell::with_program("/nonexistent/su");
        let result = shell.exec("id").await;

        assert!(!result.success);
        assert_eq!(result.exit_code, -1);
        assert!(result.output.is_empty());
        assert!(!result.error.is_empty());
    }

    #[tokio::test]
    async fn root_probe_checks_uid_marker() {
        let dir = tempfile::tempdir().unwrap();

        let root = SuShell::with_program(fake_su(dir.path(), "uid=0(root) gid=0(root)"));
        assert!(root.probe_root().await);

        let other = tempfile::tempdir().unwrap();
        let shell = SuShell::with_program(fake_su(other.path(), "uid=2000(shell) gid=2000(shell)"));
        assert!(!shell.probe_root().await);

        assert!(!SuShell::with_program("/nonexistent/su").probe_root().await);
    }
}
