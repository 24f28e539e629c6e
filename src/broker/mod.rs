//! Privileged shell broker.
//!
//! Runs as root (or adb shell) and executes commands for peers whose uid is
//! on its allow list. Other peers can only ping it and ask for access.

mod commands;
mod exec;
mod server;

pub use commands::BrokerCommand;
pub use exec::{exec, exec_exit_code};
pub use server::BrokerServer;
