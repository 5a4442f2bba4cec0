//! Configuration loading for the command line tool
//!
//! The configuration types themselves live in `sp_core::config`; this module
//! reads and writes them as RON.

mod manager;

pub use manager::ConfigManager;
