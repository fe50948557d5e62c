//! Host platform classification.
//!
//! Every platform-dependent decision matches on [`Platform`] exhaustively; an operating
//! system outside the supported set is rejected once, at detection time.

use std::fmt;

use once_cell::sync::OnceCell;

use crate::errors::LaunchError;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Platform {
    Windows,
    Linux,
    Macos,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Linux => "linux",
            Platform::Macos => "macos",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify an operating system name as reported by `std::env::consts::OS`.
pub fn classify(os: &str) -> Result<Platform, LaunchError> {
    match os {
        "windows" => Ok(Platform::Windows),
        "linux" => Ok(Platform::Linux),
        "macos" => Ok(Platform::Macos),
        other => Err(LaunchError::UnknownPlatform(other.to_string())),
    }
}

static DETECTED: OnceCell<Option<Platform>> = OnceCell::new();

/// Platform of the running process, memoized for the process lifetime.
pub fn current() -> Result<Platform, LaunchError> {
    DETECTED
        .get_or_init(|| classify(std::env::consts::OS).ok())
        .ok_or_else(|| LaunchError::UnknownPlatform(std::env::consts::OS.to_string()))
}
