#![allow(clippy::module_name_repetitions)]
//! Docker runtime discovery.

use std::env;
use std::io;
use std::path::PathBuf;

use which::which;

/// Locate the container engine binary: `MINIAN_DOCKER_ENGINE` (name or path) when set,
/// otherwise `docker` on PATH.
pub fn container_runtime_path() -> io::Result<PathBuf> {
    let name = env::var("MINIAN_DOCKER_ENGINE")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "docker".to_string());

    if let Ok(p) = which(&name) {
        return Ok(p);
    }
    Err(io::Error::new(
        io::ErrorKind::NotFound,
        format!("{name} is required but was not found in PATH."),
    ))
}
