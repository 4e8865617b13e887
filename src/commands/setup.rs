//! Setup command - Provisions the build tree

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::*;

use crate::core::config::{BuildConfiguration, ConfigFile, FailurePolicy, parse_define};
use crate::core::host::HostOs;
use crate::core::process::{CommandRunner, SystemRunner};
use crate::core::{provision, utils};

#[derive(Args, Debug, Default, Clone)]
pub struct SetupArgs {
    /// Remove the build directory before provisioning
    #[arg(long)]
    pub clean: bool,

    /// Build directory (default: build)
    #[arg(long, value_name = "DIR")]
    pub build_dir: Option<PathBuf>,

    /// Source tree, relative to the build directory (default: ..)
    #[arg(long, value_name = "DIR")]
    pub source_dir: Option<PathBuf>,

    /// CMake generator (default: Visual Studio 17 2022 on Windows, Ninja elsewhere)
    #[arg(short = 'G', long)]
    pub generator: Option<String>,

    /// Target architecture passed as -A
    #[arg(short = 'A', long = "arch")]
    pub architecture: Option<String>,

    /// Toolchain file passed as CMAKE_TOOLCHAIN_FILE
    #[arg(long, value_name = "FILE")]
    pub toolchain_file: Option<PathBuf>,

    /// Config file with [vcpkg] toolchain_file and optional [build] settings
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Target built after configuring (default: fix-format)
    #[arg(long, value_name = "NAME")]
    pub format_target: Option<String>,

    /// Skip the format target
    #[arg(long, conflicts_with = "format_target")]
    pub no_format: bool,

    /// Dependency graph output (default: deps.dot)
    #[arg(long, value_name = "PATH")]
    pub graphviz: Option<PathBuf>,

    /// Do not export the dependency graph
    #[arg(long, conflicts_with = "graphviz")]
    pub no_graphviz: bool,

    /// Extra cache entries, KEY=VALUE
    #[arg(short = 'D', value_name = "KEY=VALUE")]
    pub defines: Vec<String>,

    /// CMake executable
    #[arg(long, value_name = "PATH")]
    pub cmake: Option<String>,

    /// Keep going when a tool exits non-zero
    #[arg(long)]
    pub continue_on_error: bool,
}

pub fn run(args: SetupArgs, _verbose: bool) -> Result<()> {
    run_with(&args, HostOs::current(), &mut SystemRunner)
}

/// Resolve the configuration, then clean and provision with `runner`
pub fn run_with(args: &SetupArgs, host: HostOs, runner: &mut dyn CommandRunner) -> Result<()> {
    let config = configuration(args, host)?;

    if args.clean {
        super::clean::clean_dir(&config.build_dir)?;
    }

    utils::print_header("🔧 Provisioning build tree...");
    utils::print_path("Build directory", &config.build_dir);
    println!("   Generator: {}", config.generator.bright_green());
    if let Some(toolchain) = &config.toolchain_file {
        utils::print_path("Toolchain", toolchain);
    }

    let report = provision::provision(&config, runner).context("Provisioning failed")?;

    if report.failures.is_empty() {
        println!("{}", "✓ Build tree ready!".bright_green().bold());
    } else {
        for failure in &report.failures {
            utils::print_warning(&format!(
                "{} step exited with {:?}",
                failure.step, failure.code
            ));
        }
        println!(
            "{}",
            "⚠ Build tree provisioned with ignored failures".bright_yellow().bold()
        );
    }

    Ok(())
}

/// Layer defaults, the config file and the command line
pub fn configuration(args: &SetupArgs, host: HostOs) -> Result<BuildConfiguration> {
    let mut config = BuildConfiguration::for_host(host);

    if let Some(path) = &args.config {
        let file = ConfigFile::load(path)?;
        if args.toolchain_file.is_none() {
            file.toolchain_file()?;
        }
        config.apply_file(&file);
    }

    if let Some(dir) = &args.build_dir {
        config.build_dir = dir.clone();
    }
    if let Some(dir) = &args.source_dir {
        config.source_dir = dir.clone();
    }
    if let Some(generator) = &args.generator {
        config.generator = generator.clone();
    }
    if args.architecture.is_some() {
        config.architecture = args.architecture.clone();
    }
    if args.toolchain_file.is_some() {
        config.toolchain_file = args.toolchain_file.clone();
    }
    if args.format_target.is_some() {
        config.format_target = args.format_target.clone();
    }
    if args.no_format {
        config.format_target = None;
    }
    if args.graphviz.is_some() {
        config.graphviz = args.graphviz.clone();
    }
    if args.no_graphviz {
        config.graphviz = None;
    }
    if let Some(cmake) = &args.cmake {
        config.cmake = cmake.clone();
    }
    if args.continue_on_error {
        config.policy = FailurePolicy::ContinueOnError;
    }
    for raw in &args.defines {
        config.defines.push(parse_define(raw)?);
    }

    log::debug!("resolved configuration: {:?}", config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{ConfigError, ProvisionError};
    use crate::core::process::testing::RecordingRunner;

    #[test]
    fn missing_toolchain_fails_before_any_side_effect() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let config_path = tmp.path().join("setup.toml");
        std::fs::write(&config_path, "[vcpkg]\n").expect("write config");
        let build_dir = tmp.path().join("build");

        let args = SetupArgs {
            config: Some(config_path),
            build_dir: Some(build_dir.clone()),
            ..SetupArgs::default()
        };
        let mut runner = RecordingRunner::default();

        let err = run_with(&args, HostOs::Other, &mut runner).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::MissingKey { .. })
        ));
        assert!(runner.calls.is_empty());
        assert!(!build_dir.exists());
    }

    #[test]
    fn toolchain_from_config_reaches_the_generator() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let config_path = tmp.path().join("setup.toml");
        std::fs::write(
            &config_path,
            "[vcpkg]\ntoolchain_file = \"/opt/vcpkg/scripts/buildsystems/vcpkg.cmake\"\n",
        )
        .expect("write config");

        let args = SetupArgs {
            config: Some(config_path),
            build_dir: Some(tmp.path().join("build")),
            no_format: true,
            ..SetupArgs::default()
        };
        let mut runner = RecordingRunner::default();

        run_with(&args, HostOs::Other, &mut runner).expect("setup");

        assert_eq!(runner.calls.len(), 1);
        assert!(runner.calls[0]
            .args
            .contains(&"-DCMAKE_TOOLCHAIN_FILE=/opt/vcpkg/scripts/buildsystems/vcpkg.cmake".to_string()));
    }

    #[test]
    fn cli_flags_win_over_defaults() {
        let args = SetupArgs {
            generator: Some("Unix Makefiles".into()),
            architecture: Some("x64".into()),
            no_graphviz: true,
            defines: vec!["CMAKE_BUILD_TYPE=Release".into()],
            continue_on_error: true,
            ..SetupArgs::default()
        };

        let config = configuration(&args, HostOs::Windows).expect("configuration");

        assert_eq!(config.generator, "Unix Makefiles");
        assert_eq!(config.architecture.as_deref(), Some("x64"));
        assert_eq!(config.graphviz, None);
        assert_eq!(config.policy, FailurePolicy::ContinueOnError);
        assert_eq!(
            config.defines,
            vec![("CMAKE_BUILD_TYPE".to_string(), "Release".to_string())]
        );
    }

    #[test]
    fn default_generator_follows_host() {
        let args = SetupArgs::default();
        assert_eq!(
            configuration(&args, HostOs::Other).expect("configuration").generator,
            "Ninja"
        );
        assert_eq!(
            configuration(&args, HostOs::Windows).expect("configuration").generator,
            "Visual Studio 17 2022"
        );
    }

    #[test]
    fn clean_flag_wipes_previous_tree() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let build_dir = tmp.path().join("build");
        std::fs::create_dir_all(&build_dir).expect("create build dir");
        let stale = build_dir.join("CMakeCache.txt");
        std::fs::write(&stale, "stale").expect("write cache");

        let args = SetupArgs {
            clean: true,
            build_dir: Some(build_dir.clone()),
            ..SetupArgs::default()
        };
        run_with(&args, HostOs::Other, &mut RecordingRunner::default()).expect("setup");

        assert!(build_dir.is_dir());
        assert!(!stale.exists());
    }

    #[test]
    fn failing_generator_surfaces_tool_error() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let args = SetupArgs {
            build_dir: Some(tmp.path().join("build")),
            ..SetupArgs::default()
        };
        let mut runner = RecordingRunner::with_codes(&[4]);

        let err = run_with(&args, HostOs::Other, &mut runner).unwrap_err();

        let tool = err.downcast_ref::<ProvisionError>().expect("provision error");
        assert_eq!(tool.exit_code(), 4);
    }
}
