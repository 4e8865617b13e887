//! Configuration module - Build configuration, config file and defaults
//!
//! Values are layered: built-in defaults, then the optional config file,
//! then command line overrides.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ini::{Ini, ParseOption};
use serde::Deserialize;

use crate::core::error::ConfigError;
use crate::core::host::HostOs;

/// Built-in defaults
pub mod defaults {
    /// Build directory, relative to where the tool is started
    pub const BUILD_DIR: &str = "build";

    /// Source tree, relative to the build directory
    pub const SOURCE_DIR: &str = "..";

    /// Target that reformats the engine sources
    pub const FORMAT_TARGET: &str = "fix-format";

    /// Dependency graph written by the generator
    pub const GRAPHVIZ: &str = "deps.dot";

    /// Generator executable
    pub const CMAKE: &str = "cmake";
}

/// What to do when an external tool exits non-zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Stop and report the tool's exit code
    #[default]
    Strict,
    /// Warn and carry on with the next step
    ContinueOnError,
}

impl FailurePolicy {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "strict" => Some(FailurePolicy::Strict),
            "continue-on-error" => Some(FailurePolicy::ContinueOnError),
            _ => None,
        }
    }
}

/// Everything one provisioning run needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfiguration {
    pub build_dir: PathBuf,
    pub source_dir: PathBuf,
    pub generator: String,
    pub architecture: Option<String>,
    pub toolchain_file: Option<PathBuf>,
    pub graphviz: Option<PathBuf>,
    pub defines: Vec<(String, String)>,
    pub format_target: Option<String>,
    pub cmake: String,
    pub policy: FailurePolicy,
}

impl BuildConfiguration {
    /// Defaults for the given host
    pub fn for_host(host: HostOs) -> Self {
        Self {
            build_dir: PathBuf::from(defaults::BUILD_DIR),
            source_dir: PathBuf::from(defaults::SOURCE_DIR),
            generator: host.default_generator().to_string(),
            architecture: None,
            toolchain_file: None,
            graphviz: Some(PathBuf::from(defaults::GRAPHVIZ)),
            defines: Vec::new(),
            format_target: Some(defaults::FORMAT_TARGET.to_string()),
            cmake: defaults::CMAKE.to_string(),
            policy: FailurePolicy::Strict,
        }
    }

    /// Fold the `[build]` section of a config file over these values
    pub fn apply_file(&mut self, file: &ConfigFile) {
        let build = &file.build;
        if let Some(dir) = &build.build_dir {
            self.build_dir = dir.clone();
        }
        if let Some(dir) = &build.source_dir {
            self.source_dir = dir.clone();
        }
        if let Some(generator) = &build.generator {
            self.generator = generator.clone();
        }
        if build.architecture.is_some() {
            self.architecture = build.architecture.clone();
        }
        if build.graphviz.is_some() {
            self.graphviz = build.graphviz.clone();
        }
        if build.format_target.is_some() {
            self.format_target = build.format_target.clone();
        }
        if let Some(cmake) = &build.cmake {
            self.cmake = cmake.clone();
        }
        if let Some(policy) = build.on_error {
            self.policy = policy;
        }
        self.defines
            .extend(build.defines.iter().map(|(k, v)| (k.clone(), v.clone())));
        if let Some(vcpkg) = &file.vcpkg {
            if vcpkg.toolchain_file.is_some() {
                self.toolchain_file = vcpkg.toolchain_file.clone();
            }
        }
    }
}

/// On-disk config file. `.toml` files are read as TOML, anything else as
/// plain INI with unquoted values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    #[serde(skip)]
    pub path: PathBuf,
    pub vcpkg: Option<VcpkgSection>,
    pub build: BuildSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VcpkgSection {
    pub toolchain_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BuildSection {
    pub build_dir: Option<PathBuf>,
    pub source_dir: Option<PathBuf>,
    pub generator: Option<String>,
    pub architecture: Option<String>,
    pub graphviz: Option<PathBuf>,
    pub format_target: Option<String>,
    pub cmake: Option<String>,
    pub on_error: Option<FailurePolicy>,
    pub defines: BTreeMap<String, String>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        let mut file = if is_toml {
            Self::parse(&text, path)?
        } else {
            Self::parse_ini(&text, path)?
        };
        file.path = path.to_path_buf();
        log::debug!("loaded config file {}", path.display());
        Ok(file)
    }

    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse_ini(text: &str, path: &Path) -> Result<Self, ConfigError> {
        // Backslashes are kept as-is so Windows paths survive
        let options = ParseOption {
            enabled_escape: false,
            ..ParseOption::default()
        };
        let ini = Ini::load_from_str_opt(text, options).map_err(|source| ConfigError::ParseIni {
            path: path.to_path_buf(),
            source,
        })?;

        let value = |section: &str, key: &str| {
            ini.get_from(Some(section), key)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        let vcpkg = ini.section(Some("vcpkg")).map(|_| VcpkgSection {
            toolchain_file: value("vcpkg", "toolchain_file").map(PathBuf::from),
        });

        let on_error = match value("build", "on_error") {
            Some(raw) => Some(FailurePolicy::from_name(&raw).ok_or_else(|| {
                ConfigError::InvalidValue {
                    path: path.to_path_buf(),
                    key: "on_error",
                    value: raw.clone(),
                }
            })?),
            None => None,
        };

        let defines = ini
            .section(Some("build.defines"))
            .map(|props| {
                props
                    .iter()
                    .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                    .collect()
            })
            .unwrap_or_default();

        let build = BuildSection {
            build_dir: value("build", "build_dir").map(PathBuf::from),
            source_dir: value("build", "source_dir").map(PathBuf::from),
            generator: value("build", "generator"),
            architecture: value("build", "architecture"),
            graphviz: value("build", "graphviz").map(PathBuf::from),
            format_target: value("build", "format_target"),
            cmake: value("build", "cmake"),
            on_error,
            defines,
        };

        Ok(Self {
            path: path.to_path_buf(),
            vcpkg,
            build,
        })
    }

    /// `[vcpkg] toolchain_file`, which toolchain-aware setups cannot do without
    pub fn toolchain_file(&self) -> Result<&Path, ConfigError> {
        self.vcpkg
            .as_ref()
            .and_then(|section| section.toolchain_file.as_deref())
            .ok_or_else(|| ConfigError::MissingKey {
                path: self.path.clone(),
                section: "vcpkg",
                key: "toolchain_file",
            })
    }
}

/// Split a `KEY=VALUE` define
pub fn parse_define(raw: &str) -> Result<(String, String), ConfigError> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(ConfigError::InvalidDefine(raw.to_string())),
    }
}
