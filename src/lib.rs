//! termprofile application crate.
//!
//! Hosts the command-line front end and the log bridge. The profile store
//! itself lives in `termprofile-config` and is re-exported here as `config`.

pub mod cli;
pub mod debug;

pub use termprofile_config as config;
