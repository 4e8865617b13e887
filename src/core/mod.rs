//! Core module - Setup procedures shared by the commands

pub mod config;
pub mod error;
pub mod host;
pub mod patcher;
pub mod process;
pub mod provision;
pub mod utils;
