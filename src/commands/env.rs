//! Env command - Shows the host and the build tools found on PATH
use anyhow::Result;
use colored::*;
use xshell::Shell;

use crate::core::host::HostOs;
use crate::core::utils;

/// Tools the build tree depends on
const TOOLS: &[&str] = &["cmake", "ninja"];

pub fn run(_verbose: bool) -> Result<()> {
    println!("{}", "🔧 Build environment:".bright_cyan());
    println!();

    let host = HostOs::current();
    println!("   Host: {}", host.to_string().bright_green());
    println!("   Default generator: {}", host.default_generator().bright_green());
    println!();

    let sh = Shell::new()?;
    for tool in TOOLS {
        match tool_version(&sh, tool) {
            Some(version) => utils::print_success(&format!("{}: {}", tool, version)),
            None => utils::print_warning(&format!("{} not found on PATH", tool)),
        }
    }

    Ok(())
}

/// First line of `<tool> --version`, if the tool runs
fn tool_version(sh: &Shell, tool: &str) -> Option<String> {
    let output = sh.cmd(tool).arg("--version").quiet().ignore_stderr().read();
    match output {
        Ok(text) => first_line(&text),
        Err(err) => {
            log::debug!("{tool} --version failed: {err}");
            None
        }
    }
}

fn first_line(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_first_non_empty_line() {
        let text = "\ncmake version 3.28.3\n\nCMake suite maintained and supported by Kitware.\n";
        assert_eq!(first_line(text).as_deref(), Some("cmake version 3.28.3"));
        assert_eq!(first_line("   \n"), None);
    }
}
