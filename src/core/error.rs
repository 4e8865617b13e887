//! Error module - Typed failures of the setup procedures

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Configuration could not be assembled
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("malformed INI config file {path}")]
    ParseIni {
        path: PathBuf,
        #[source]
        source: ini::ParseError,
    },

    #[error("config file {path} has an invalid `{key}` value `{value}`")]
    InvalidValue {
        path: PathBuf,
        key: &'static str,
        value: String,
    },

    #[error("config file {path} has no `{key}` key in section [{section}]")]
    MissingKey {
        path: PathBuf,
        section: &'static str,
        key: &'static str,
    },

    #[error("invalid define `{0}`, expected KEY=VALUE")]
    InvalidDefine(String),
}

/// Provisioning the build tree failed
#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("failed to create build directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to remove build directory {path}")]
    RemoveDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to launch `{tool}`")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("`{tool}` failed with {}", describe_code(.code))]
    ExternalToolFailure { tool: String, code: Option<i32> },
}

impl ProvisionError {
    /// Process exit code to report for this failure
    pub fn exit_code(&self) -> i32 {
        match self {
            ProvisionError::ExternalToolFailure {
                code: Some(code), ..
            } if *code != 0 => *code,
            _ => 1,
        }
    }
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// Patching a source file failed
#[derive(Error, Debug)]
pub enum PatchError {
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    #[error("{0} is not valid UTF-8")]
    InvalidUtf8(PathBuf),

    #[error("I/O error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PatchError {
    pub fn from_io(path: PathBuf, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => PatchError::FileNotFound(path),
            io::ErrorKind::PermissionDenied => PatchError::PermissionDenied(path),
            io::ErrorKind::InvalidData => PatchError::InvalidUtf8(path),
            _ => PatchError::Io { path, source },
        }
    }
}
