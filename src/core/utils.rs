//! Utilities module - Console output helpers

use std::path::Path;

use colored::*;

/// Print the tool banner unless running quietly
pub fn print_banner(quiet: bool) {
    if quiet {
        return;
    }
    println!("{}", "⚙ gestalt-setup - Gestalt engine build setup".bright_cyan().bold());
    println!();
}

/// Print a section header
pub fn print_header(message: &str) {
    println!("{}", message.bright_yellow());
}

/// Print a step message
pub fn print_step(message: &str) {
    println!("   {} {}", "→".bright_blue(), message);
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("   {} {}", "✓".bright_green(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("   {} {}", "✗".bright_red(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("   {} {}", "⚠".bright_yellow(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("   {} {}", "ℹ".bright_cyan(), message);
}

/// Print a `label: path` line
pub fn print_path(label: &str, path: &Path) {
    println!("   {}: {}", label, path.display().to_string().bright_cyan());
}
