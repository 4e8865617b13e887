//! Host module - Host platform detection and generator defaults

use std::fmt;

/// Generator used on Windows hosts (IDE project files)
pub const IDE_GENERATOR: &str = "Visual Studio 17 2022";

/// Generator used everywhere else
pub const LIGHTWEIGHT_GENERATOR: &str = "Ninja";

/// Operating system family of the machine running the setup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOs {
    Windows,
    Other,
}

impl HostOs {
    pub fn current() -> Self {
        Self::from_os_name(std::env::consts::OS)
    }

    /// Map a `std::env::consts::OS` style name to a host family
    pub fn from_os_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("windows") {
            HostOs::Windows
        } else {
            HostOs::Other
        }
    }

    /// Generator picked when none is given explicitly
    pub fn default_generator(self) -> &'static str {
        match self {
            HostOs::Windows => IDE_GENERATOR,
            HostOs::Other => LIGHTWEIGHT_GENERATOR,
        }
    }
}

impl fmt::Display for HostOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostOs::Windows => write!(f, "windows"),
            HostOs::Other => write!(f, "{}", std::env::consts::OS),
        }
    }
}
