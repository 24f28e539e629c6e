pub mod config;
pub mod control;
pub mod ipc;
pub mod run;
pub mod watcher;
