//! Provision module - Build tree provisioning
//!
//! Creates the build directory, runs the CMake configure step inside it and
//! optionally builds the format target afterwards.

use std::path::Path;

use crate::core::config::{BuildConfiguration, FailurePolicy};
use crate::core::error::ProvisionError;
use crate::core::process::{CommandRunner, Invocation};
use crate::core::utils;

/// Tool failure tolerated under `ContinueOnError`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToleratedFailure {
    pub step: &'static str,
    pub code: Option<i32>,
}

/// What a provisioning run did
#[derive(Debug, Default)]
pub struct ProvisionReport {
    pub invocations: Vec<Invocation>,
    pub failures: Vec<ToleratedFailure>,
}

/// Outcome of removing the build directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanOutcome {
    Removed,
    Missing,
}

/// Arguments of the configure step, in the order CMake receives them
pub fn generator_args(config: &BuildConfiguration) -> Vec<String> {
    let mut args = vec![
        config.source_dir.display().to_string(),
        "-G".to_string(),
        config.generator.clone(),
    ];

    if let Some(arch) = &config.architecture {
        args.push("-A".to_string());
        args.push(arch.clone());
    }

    if let Some(toolchain) = &config.toolchain_file {
        args.push(format!("-DCMAKE_TOOLCHAIN_FILE={}", toolchain.display()));
    }

    if let Some(graph) = &config.graphviz {
        args.push(format!("--graphviz={}", graph.display()));
    }

    for (key, value) in &config.defines {
        args.push(format!("-D{key}={value}"));
    }

    args
}

/// Invocation that builds a single named target in `build_dir`
pub fn build_target_invocation(config: &BuildConfiguration, target: &str) -> Invocation {
    Invocation::new(&config.cmake, &config.build_dir).args(["--build", ".", "--target", target])
}

/// Provision the build tree described by `config`
pub fn provision(
    config: &BuildConfiguration,
    runner: &mut dyn CommandRunner,
) -> Result<ProvisionReport, ProvisionError> {
    let mut report = ProvisionReport::default();

    ensure_dir(&config.build_dir)?;

    let configure =
        Invocation::new(&config.cmake, &config.build_dir).args(generator_args(config));
    utils::print_step(&format!("Configuring with {}", config.generator));
    run_step(runner, &configure, "configure", config.policy, &mut report)?;

    if let Some(target) = &config.format_target {
        let format = build_target_invocation(config, target);
        utils::print_step(&format!("Building target {target}"));
        run_step(runner, &format, "format", config.policy, &mut report)?;
    }

    Ok(report)
}

fn run_step(
    runner: &mut dyn CommandRunner,
    invocation: &Invocation,
    step: &'static str,
    policy: FailurePolicy,
    report: &mut ProvisionReport,
) -> Result<(), ProvisionError> {
    log::info!("{step}: {invocation}");
    let status = runner.run(invocation)?;
    report.invocations.push(invocation.clone());

    if status.success() {
        return Ok(());
    }

    match policy {
        FailurePolicy::Strict => Err(ProvisionError::ExternalToolFailure {
            tool: invocation.program.clone(),
            code: status.code,
        }),
        FailurePolicy::ContinueOnError => {
            log::warn!("{step} step failed with {:?}, continuing", status.code);
            utils::print_warning(&format!(
                "{} step failed ({}), continuing",
                step,
                invocation.program
            ));
            report.failures.push(ToleratedFailure {
                step,
                code: status.code,
            });
            Ok(())
        }
    }
}

/// Create `path` and its parents; an existing directory is fine
pub fn ensure_dir(path: &Path) -> Result<(), ProvisionError> {
    std::fs::create_dir_all(path).map_err(|source| ProvisionError::CreateDir {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("build directory ready: {}", path.display());
    Ok(())
}

/// Remove the build directory if there is one
pub fn clean_build(path: &Path) -> Result<CleanOutcome, ProvisionError> {
    if !path.exists() {
        return Ok(CleanOutcome::Missing);
    }

    std::fs::remove_dir_all(path).map_err(|source| ProvisionError::RemoveDir {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(CleanOutcome::Removed)
}
