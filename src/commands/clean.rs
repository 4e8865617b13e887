//! Clean command - Removes the build directory
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::config::defaults;
use crate::core::provision::{self, CleanOutcome};
use crate::core::utils;

pub fn run(build_dir: Option<PathBuf>, _verbose: bool) -> Result<()> {
    let dir = build_dir.unwrap_or_else(|| PathBuf::from(defaults::BUILD_DIR));
    clean_dir(&dir)
}

/// Remove `dir`, reporting a missing directory instead of failing
pub fn clean_dir(dir: &Path) -> Result<()> {
    utils::print_header("🧹 Cleaning build directory...");

    match provision::clean_build(dir)? {
        CleanOutcome::Removed => {
            utils::print_success(&format!("Cleaned build directory: {}", dir.display()));
        }
        CleanOutcome::Missing => {
            utils::print_info(&format!("Build directory does not exist: {}", dir.display()));
        }
    }

    Ok(())
}
