#[cfg(not(unix))]
compile_error!("linkfarm only supports Unix-like systems");

pub mod commands;
pub mod error;
pub mod link;
pub mod manager;
pub mod package;
pub mod runtime;
pub mod walk;
