pub mod access;
pub mod cmd;
pub mod config;
pub mod led;
pub mod shell;
