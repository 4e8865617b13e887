//! Process module - Running external tools
//!
//! Every invocation names its own working directory, so nothing here ever
//! changes the working directory of the setup process itself.

use std::fmt;
use std::path::PathBuf;
use std::process::Command;

use colored::*;

use crate::core::error::ProvisionError;

/// One external command to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl Invocation {
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.contains(' ') {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// How a finished tool exited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolStatus {
    pub code: Option<i32>,
}

impl ToolStatus {
    pub fn success(self) -> bool {
        self.code == Some(0)
    }
}

/// Executes invocations synchronously
pub trait CommandRunner {
    /// Run to completion. `Err` only when the tool could not be started;
    /// a non-zero exit is reported through the returned status.
    fn run(&mut self, invocation: &Invocation) -> Result<ToolStatus, ProvisionError>;
}

/// Runs tools for real with the terminal attached, so generator warnings
/// and vcpkg progress show up as they happen
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<ToolStatus, ProvisionError> {
        log::debug!("running `{}` in {}", invocation, invocation.cwd.display());

        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .status()
            .map_err(|source| ProvisionError::Spawn {
                tool: invocation.program.clone(),
                source,
            })?;

        let status = ToolStatus {
            code: status.code(),
        };
        if !status.success() {
            eprintln!(
                "   {} {} exited with {:?}",
                "✗".bright_red(),
                invocation.program,
                status.code
            );
        }

        Ok(status)
    }
}
