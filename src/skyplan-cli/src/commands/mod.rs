//! Command handlers for skyplan CLI
//!
//! Each subcommand has its own module with handler functions.

pub mod build;
pub mod configure;
