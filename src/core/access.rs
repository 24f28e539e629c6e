use crate::common::AccessStatus;
use crate::core::shell::{BrokerClient, BrokerProbe, SuShell};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

/// Last observed access outcome, shared with the executor's routing.
#[derive(Debug, Default)]
pub struct AccessState {
    direct_root: AtomicBool,
    broker_ready: AtomicBool,
    status: RwLock<AccessStatus>,
}

impl AccessState {
    pub fn record(&self, status: AccessStatus) {
        self.direct_root
            .store(status == AccessStatus::UsingRootDirectly, Ordering::Release);
        self.broker_ready
            .store(status == AccessStatus::Ready, Ordering::Release);
        if let Ok(mut s) = self.status.write() {
            *s = status;
        }
    }

    pub fn status(&self) -> AccessStatus {
        self.status.read().map(|s| *s).unwrap_or_default()
    }

    pub fn is_ready(&self) -> bool {
        self.is_using_direct_root() || self.is_broker_available()
    }

    pub fn is_using_direct_root(&self) -> bool {
        self.direct_root.load(Ordering::Acquire)
    }

    pub fn is_broker_available(&self) -> bool {
        self.broker_ready.load(Ordering::Acquire)
    }
}

pub struct AccessProber {
    su: SuShell,
    broker: Arc<BrokerClient>,
    state: Arc<AccessState>,
}

impl AccessProber {
    pub fn new(su: SuShell, broker: Arc<BrokerClient>, state: Arc<AccessState>) -> Self {
        Self { su, broker, state }
    }

    pub fn state(&self) -> &Arc<AccessState> {
        &self.state
    }

    /// Direct root wins; otherwise the broker handshake decides.
    pub async fn check_status(&self) -> AccessStatus {
        let status = if self.su.probe_root().await {
            debug!(target: "reclight::access", "Direct root available");
            AccessStatus::UsingRootDirectly
        } else {
            match self.broker.probe().await {
                BrokerProbe::Granted => AccessStatus::Ready,
                BrokerProbe::Denied => AccessStatus::PermissionRequired,
                BrokerProbe::NotRunning => {
                    debug!(target: "reclight::access", "Broker not running");
                    AccessStatus::NotRunning
                }
                BrokerProbe::Unavailable(reason) => {
                    warn!(target: "reclight::access", "Status check failed: {}", reason);
                    AccessStatus::NotInstalled
                }
            }
        };

        let previous = self.state.status();
        self.state.record(status);
        if previous != status {
            info!(
                target: "reclight::access",
                "Access status: {} -> {}",
                previous.wire_str(),
                status.wire_str()
            );
        }

        match status {
            AccessStatus::Ready => {
                self.broker.bind().await;
            }
            _ => self.broker.unbind().await,
        }
        status
    }

    /// Asks a running broker to trust our uid. Errors are logged, not returned.
    pub async fn request_permission(&self) -> bool {
        match self.broker.probe().await {
            BrokerProbe::Denied => match self.broker.request_permission().await {
                Ok(resp) => {
                    info!(target: "reclight::access", "Permission requested: {}", resp);
                    true
                }
                Err(e) => {
                    warn!(target: "reclight::access", "Failed to request permission: {:#}", e);
                    false
                }
            },
            BrokerProbe::Granted => true,
            other => {
                debug!(target: "reclight::access", "Cannot request permission, broker {:?}", other);
                false
            }
        }
    }

    pub async fn broker_uid(&self) -> i32 {
        self.broker.uid().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::time::Duration;

    fn fake_su(dir: &std::path::Path, id_line: &str) -> SuShell {
        let path = dir.join("su");
        std::fs::write(&path, format!("#!/bin/sh\necho '{}'\n", id_line)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        SuShell::with_program(path.to_string_lossy().into_owned())
    }

    fn prober(su: SuShell, socket: std::path::PathBuf) -> AccessProber {
        let broker = Arc::new(BrokerClient::new(socket, Duration::from_secs(1)));
        AccessProber::new(su, broker, Arc::new(AccessState::default()))
    }

    #[test]
    fn starts_out_checking() {
        let state = AccessState::default();
        assert_eq!(state.status(), AccessStatus::Checking);
        assert!(!state.is_ready());
    }

    #[tokio::test]
    async fn direct_root_takes_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let p = prober(fake_su(dir.path(), "uid=0(root) gid=0(root)"), dir.path().join("b.sock"));

        assert_eq!(p.check_status().await, AccessStatus::UsingRootDirectly);
        assert!(p.state().is_using_direct_root());
        assert!(!p.state().is_broker_available());
        assert!(p.state().is_ready());
    }

    #[tokio::test]
    async fn no_root_and_no_broker_is_not_running() {
        let dir = tempfile::tempdir().unwrap();
        let p = prober(fake_su(dir.path(), "uid=10123(u0_a123)"), dir.path().join("b.sock"));

        assert_eq!(p.check_status().await, AccessStatus::NotRunning);
        assert!(!p.state().is_ready());
        assert!(!p.request_permission().await);
    }

    #[tokio::test]
    async fn broker_outcomes_map_to_status() {
        let dir = tempfile::tempdir().unwrap();
        let our_uid = unsafe { libc::getuid() };

        let granted = dir.path().join("granted.sock");
        let server = crate::broker::BrokerServer::new(vec![our_uid]);
        let path = granted.clone();
        tokio::spawn(async move { server.serve(path).await });

        let denied = dir.path().join("denied.sock");
        let server = crate::broker::BrokerServer::new(vec![]);
        let path = denied.clone();
        tokio::spawn(async move { server.serve(path).await });

        tokio::time::sleep(Duration::from_millis(100)).await;

        let p = prober(SuShell::with_program("/nonexistent/su"), granted);
        assert_eq!(p.check_status().await, AccessStatus::Ready);
        assert!(p.state().is_broker_available());
        assert_eq!(p.broker_uid().await, our_uid as i32);

        let p = prober(SuShell::with_program("/nonexistent/su"), denied);
        assert_eq!(p.check_status().await, AccessStatus::PermissionRequired);
        assert!(!p.state().is_ready());
        assert!(p.request_permission().await);
    }
}
