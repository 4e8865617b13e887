//! Subcommands of gestalt-setup

pub mod clean;
pub mod env;
pub mod patch;
pub mod setup;
