//! Patch command - Rewrites an identifier inside a source file
use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::*;
use regex::Regex;

use crate::core::{patcher, utils};

pub fn run(
    file: PathBuf,
    from: &str,
    to: &str,
    literal: bool,
    dry_run: bool,
    _verbose: bool,
) -> Result<()> {
    utils::print_header(&format!("🩹 Patching {}...", file.display()));

    let source = if literal {
        regex::escape(from)
    } else {
        from.to_string()
    };
    let pattern = Regex::new(&source).with_context(|| format!("Invalid pattern: {from}"))?;

    if dry_run {
        let count = patcher::count_matches(&file, &pattern)?;
        utils::print_info(&format!(
            "{} occurrence(s) of {} would be replaced",
            count,
            from.bright_cyan()
        ));
        return Ok(());
    }

    let count = patcher::patch_file(&file, &pattern, to)?;

    if count == 0 {
        utils::print_info(&format!("No occurrence of {} found", from.bright_cyan()));
    } else {
        utils::print_success(&format!(
            "Replaced {} occurrence(s) of {} with {}",
            count,
            from.bright_cyan(),
            to.bright_green()
        ));
    }

    Ok(())
}
