use anyhow::{Context, Result};
use regex::Regex;
use std::process::{Output, Stdio};
use std::sync::LazyLock;
use std::time::Duration;
use tokio::process::Command;

static UID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)uid=(\d+)").expect("valid uid regex"));

/// Runs `program args..` and collects its output, killing it if it outlives `timeout`.
pub async fn run_cmd_timeout(program: &str, args: &[&str], timeout: Duration) -> Result<Output> {
    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output();

    tokio::time::timeout(timeout, child)
        .await
        .with_context(|| format!("Command timeout: {} {}", program, args.join(" ")))?
        .with_context(|| format!("Failed to execute: {}", program))
}

/// Extracts the real uid from `id` output (`uid=0(root) gid=0(root) ...`).
pub fn parse_uid(id_output: &str) -> Option<u32> {
    UID_RE
        .captures(id_output)
        .and_then(|caps| caps[1].parse().ok())
}

pub fn is_root_id(id_output: &str) -> bool {
    parse_uid(id_output) == Some(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_uid_from_id_output() {
        assert_eq!(parse_uid("uid=0(root) gid=0(root) groups=0(root)"), Some(0));
        assert_eq!(parse_uid("uid=2000(shell) gid=2000(shell)"), Some(2000));
        assert_eq!(parse_uid("permission denied"), None);
    }

    #[test]
    fn euid_is_not_mistaken_for_uid() {
        assert!(!is_root_id("uid=10234(u0_a234) euid=0(root)"));
        assert!(is_root_id("uid=0(root) context=u:r:su:s0"));
    }

    #[tokio::test]
    async fn collects_output_of_fast_commands() {
        let out = run_cmd_timeout("sh", &["-c", "echo ready"], Duration::from_secs(5))
            .await
            .unwrap();
        assert!(out.status.success());
        assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "ready");
    }

    #[tokio::test]
    async fn slow_commands_time_out() {
        let res = run_cmd_timeout("sh", &["-c", "sleep 5"], Duration::from_millis(100)).await;
        assert!(res.is_err());
    }
}
