mod broker;
mod su;

pub use broker::{BrokerClient, BrokerProbe, GREETING_DENIED, GREETING_GRANTED};
pub use su::SuShell;

use crate::core::access::AccessState;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellResult {
    pub success: bool,
    pub output: String,
    pub error: String,
    pub exit_code: i32,
}

impl ShellResult {
    pub fn from_exit(output: String, error: String, exit_code: i32) -> Self {
        Self {
            success: exit_code == 0,
            output,
            error,
            exit_code,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self::from_exit(String::new(), error.into(), -1)
    }

    /// The broker only hands back a single string; an `Error:` prefix marks failure.
    pub fn from_broker_output(output: String) -> Self {
        if output.starts_with("Error:") {
            Self::from_exit(output.clone(), output, -1)
        } else {
            Self::from_exit(output, String::new(), 0)
        }
    }
}

/// Something that can run one shell command line with elevated privileges.
pub trait ShellBackend: Send + Sync + 'static {
    fn exec(&self, command: &str) -> impl Future<Output = ShellResult> + Send;
}

/// Routes commands to the broker when it is usable, otherwise to `su`.
pub struct ShellExecutor {
    broker: Arc<BrokerClient>,
    su: SuShell,
    access: Arc<AccessState>,
}

impl ShellExecutor {
    pub fn new(broker: Arc<BrokerClient>, su: SuShell, access: Arc<AccessState>) -> Self {
        Self { broker, su, access }
    }

    pub async fn execute(&self, command: &str) -> ShellResult {
        debug!(target: "reclight::shell", "Executing command: {}", command);

        if self.access.is_broker_available() && !self.access.is_using_direct_root() {
            if let Some(result) = self.broker.exec(command).await {
                return result;
            }
            debug!(target: "reclight::shell", "Broker unavailable, falling back to su");
        }

        self.su.exec(command).await
    }

    pub async fn is_root_available(&self) -> bool {
        let result = self.execute("id").await;
        result.success && crate::core::cmd::is_root_id(&result.output)
    }
}

impl ShellBackend for ShellExecutor {
    async fn exec(&self, command: &str) -> ShellResult {
        self.execute(command).await
    }
}
