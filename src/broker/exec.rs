use tokio::process::Command;
use tracing::{debug, error};

/// Runs `sh -c command`. Returns stdout, or stderr when stdout is empty.
pub async fn exec(command: &str) -> String {
    debug!(target: "reclight::broker", "Executing: {}", command);
    match Command::new("sh").args(["-c", command]).output().await {
        Ok(out) => {
            let stdout = String::from_utf8_lossy(&out.stdout);
            if !stdout.is_empty() {
                stdout.into_owned()
            } else {
                String::from_utf8_lossy(&out.stderr).into_owned()
            }
        }
        Err(e) => {
            error!(target: "reclight::broker", "Error executing command: {}", e);
            format!("Error: {}", e)
        }
    }
}

pub async fn exec_exit_code(command: &str) -> i32 {
    debug!(target: "reclight::broker", "Executing (get exit code): {}", command);
    match Command::new("sh").args(["-c", command]).status().await {
        Ok(status) => status.code().unwrap_or(-1),
        Err(e) => {
            error!(target: "reclight::broker", "Error executing command: {}", e);
            -1
        }
    }
}
