//! gestalt-setup - Build setup for the Gestalt engine
//!
//! Provisions the CMake build tree and applies the source fix-ups the
//! third-party libraries need before they compile.
//!
//! # Usage
//! ```bash
//! gestalt-setup                       # configure build/ and run fix-format
//! gestalt-setup -clean                # same, starting from an empty build/
//! gestalt-setup --config config.ini   # toolchain from [vcpkg] toolchain_file
//! gestalt-setup patch ImGuizmo.cpp
//! ```

use std::ffi::OsString;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};

mod commands;
mod core;

use crate::core::error::ProvisionError;
use crate::core::patcher::imguizmo;
use crate::core::utils;

#[derive(Parser)]
#[command(name = "gestalt-setup")]
#[command(about = "⚙ gestalt-setup - Provisions the Gestalt engine build tree", long_about = None)]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    setup: commands::setup::SetupArgs,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Provisions the build tree (the default)
    Setup(commands::setup::SetupArgs),

    /// Removes the build directory
    Clean {
        /// Build directory (default: build)
        #[arg(long, value_name = "DIR")]
        build_dir: Option<std::path::PathBuf>,
    },

    /// Rewrites an identifier in a source file
    Patch {
        /// File to rewrite in place
        file: std::path::PathBuf,

        /// Pattern to replace (regular expression)
        #[arg(long, default_value = imguizmo::FROM)]
        from: String,

        /// Replacement, inserted literally
        #[arg(long, default_value = imguizmo::TO)]
        to: String,

        /// Treat --from as plain text
        #[arg(long)]
        literal: bool,

        /// Only count the matches
        #[arg(long)]
        dry_run: bool,
    },

    /// Shows the build environment
    Env,
}

/// Accept the historical single-dash `-clean`, but only as a leading flag:
/// values of options and anything after the subcommand are left alone
fn normalize_args(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    let cli = Cli::command();
    let mut args = args.into_iter();
    let mut normalized: Vec<OsString> = args.next().into_iter().collect();
    let mut leading = true;
    let mut expects_value = false;

    for arg in args {
        if leading && !expects_value && arg == "-clean" {
            normalized.push(OsString::from("--clean"));
            continue;
        }

        let text = arg.to_string_lossy();
        if !expects_value && (text == "--" || !text.starts_with('-')) {
            leading = false;
        }
        expects_value = leading && !expects_value && takes_value(&cli, &text);
        normalized.push(arg);
    }

    normalized
}

/// Whether a top-level option token needs the following token as its value
fn takes_value(cli: &clap::Command, token: &str) -> bool {
    if token.contains('=') {
        return false;
    }
    let matches_token = |arg: &&clap::Arg| match token.strip_prefix("--") {
        Some(long) => arg.get_long() == Some(long),
        None => {
            let mut chars = token.chars();
            chars.next() == Some('-')
                && chars.next().is_some_and(|short| arg.get_short() == Some(short))
                && chars.next().is_none()
        }
    };
    cli.get_arguments()
        .find(matches_token)
        .is_some_and(|arg| arg.get_action().takes_values())
}

/// Exit code for a failed run: the external tool's own code when one failed
fn failure_exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<ProvisionError>()
        .map_or(1, ProvisionError::exit_code)
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        None => commands::setup::run(cli.setup, cli.verbose)?,
        Some(Commands::Setup(args)) => commands::setup::run(args, cli.verbose)?,
        Some(Commands::Clean { build_dir }) => commands::clean::run(build_dir, cli.verbose)?,
        Some(Commands::Patch {
            file,
            from,
            to,
            literal,
            dry_run,
        }) => commands::patch::run(file, &from, &to, literal, dry_run, cli.verbose)?,
        Some(Commands::Env) => commands::env::run(cli.verbose)?,
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));

    init_logging(cli.verbose);
    utils::print_banner(cli.quiet);

    if let Err(err) = run(cli) {
        utils::print_error(&format!("{err:#}"));
        std::process::exit(failure_exit_code(&err));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    fn normalize(args: &[&str]) -> Vec<String> {
        normalize_args(args.iter().map(OsString::from))
            .into_iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(normalize_args(args.iter().map(OsString::from)))
            .expect("parse arguments")
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn legacy_clean_flag_is_accepted() {
        let cli = parse(&["gestalt-setup", "-clean"]);
        assert!(cli.command.is_none());
        assert!(cli.setup.clean);
    }

    #[test]
    fn bare_invocation_provisions_with_defaults() {
        let cli = parse(&["gestalt-setup"]);
        assert!(cli.command.is_none());
        assert!(!cli.setup.clean);
        assert!(cli.setup.generator.is_none());
    }

    #[test]
    fn patch_defaults_to_imguizmo_fix() {
        let cli = parse(&["gestalt-setup", "patch", "ImGuizmo.cpp"]);
        match cli.command {
            Some(Commands::Patch { from, to, .. }) => {
                assert_eq!(from, "AddBezierCurve");
                assert_eq!(to, "AddBezierCubic");
            }
            _ => panic!("expected patch command"),
        }
    }

    #[test]
    fn defines_collect_in_order() {
        let cli = parse(&["gestalt-setup", "-DA=1", "-D", "B=2", "-G", "Ninja"]);
        assert_eq!(cli.setup.defines, ["A=1", "B=2"]);
        assert_eq!(cli.setup.generator.as_deref(), Some("Ninja"));
    }

    #[test]
    fn clean_is_rewritten_only_in_leading_flag_position() {
        assert_eq!(
            normalize(&["gestalt-setup", "-v", "-clean", "-G", "Ninja"]),
            ["gestalt-setup", "-v", "--clean", "-G", "Ninja"]
        );
        assert_eq!(
            normalize(&["gestalt-setup", "patch", "-clean"]),
            ["gestalt-setup", "patch", "-clean"]
        );
        assert_eq!(
            normalize(&["gestalt-setup", "--build-dir", "-clean"]),
            ["gestalt-setup", "--build-dir", "-clean"]
        );
        assert_eq!(
            normalize(&["gestalt-setup", "-G", "-clean", "-clean"]),
            ["gestalt-setup", "-G", "-clean", "--clean"]
        );
    }

    #[test]
    fn large_tool_exit_codes_are_kept() {
        // STATUS_ACCESS_VIOLATION as reported by a crashing MSBuild
        let code = 0xC000_0005_u32 as i32;
        let err = anyhow::Error::from(ProvisionError::ExternalToolFailure {
            tool: "cmake".into(),
            code: Some(code),
        })
        .context("Provisioning failed");
        assert_eq!(failure_exit_code(&err), code);

        let err = Err::<(), _>(ProvisionError::ExternalToolFailure {
            tool: "cmake".into(),
            code: Some(300),
        })
        .context("Provisioning failed")
        .unwrap_err();
        assert_eq!(failure_exit_code(&err), 300);

        assert_eq!(failure_exit_code(&anyhow::anyhow!("bad pattern")), 1);
    }
}
