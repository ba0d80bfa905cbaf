//! Execution context: which platform the native strategy should target.
//!
//! The platform is a plain value chosen by the caller for each invocation.
//! A CLI run naturally uses the host it runs on ([`Platform::host`]); a web
//! front-end might instead trust the OS its client reports and pass that in
//! via [`Platform::from_os_name`]. The library takes no side: it only reads
//! [`ExecutionContext::platform`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operating system family that selects the native counting strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Word is reachable through COM.
    Windows,
    /// Word is reachable through AppleScript.
    MacOs,
    Linux,
    Unknown,
}

impl Platform {
    /// The platform this process was compiled for.
    pub fn host() -> Self {
        Self::from_os_name(std::env::consts::OS)
    }

    /// Map an OS name to a platform; anything unrecognised is `Unknown`.
    ///
    /// Accepts Rust's `std::env::consts::OS` values as well as the spellings
    /// commonly found in user agents and `uname` output.
    pub fn from_os_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "windows" | "win" | "win32" | "win64" | "nt" => Platform::Windows,
            "macos" | "mac" | "darwin" | "osx" | "mac os x" => Platform::MacOs,
            "linux" => Platform::Linux,
            _ => Platform::Unknown,
        }
    }

    /// Whether a native word-processor automation channel exists for this
    /// platform at all.
    pub fn has_native_automation(self) -> bool {
        matches!(self, Platform::Windows | Platform::MacOs)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::MacOs => "macos",
            Platform::Linux => "linux",
            Platform::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_os_name(s))
    }
}

/// Per-invocation execution context. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionContext {
    pub platform: Platform,
}

impl ExecutionContext {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    /// Context for the host this process runs on.
    pub fn host() -> Self {
        Self::new(Platform::host())
    }
}
