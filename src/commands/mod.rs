//! CLI commands for zettelflow

pub mod auto_promote;
pub mod config;
pub mod dispatch;
pub mod format;
pub mod health;
pub mod init;
pub mod process;
pub mod promote;
pub mod repair;
pub mod status;
