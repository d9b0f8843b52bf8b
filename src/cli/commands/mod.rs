//! Command implementations for the CLI.
//!
//! Each command is implemented in its own module.

pub mod diff;
pub mod init;
pub mod notify;
pub mod serve;
