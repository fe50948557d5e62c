//! Launch settings resolved from the environment (CLI flags override afterwards).

use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::docker::DEFAULT_OWNER_NAMESPACE;
use crate::errors::LaunchError;

pub const DEFAULT_NOTEBOOK_PORT: u16 = 8000;
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_INTERFACE: &str = "en0";

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct LaunchConfig {
    /// Registry namespace of the remote images.
    pub owner: String,
    /// Host port the notebook server is published on.
    pub notebook_port: u16,
    /// Bound for `pull` and `build`; `None` waits indefinitely. `run` is never bounded.
    pub engine_timeout: Option<Duration>,
    /// Bound for `id` and interface inspection.
    pub probe_timeout: Duration,
    /// Interface whose address macOS display forwarding points at.
    pub interface: String,
    /// Host directory mounted at `/app`.
    pub workdir: PathBuf,
    /// Request a pseudo-TTY for `docker run`.
    pub tty: bool,
    /// Pull the remote image before building.
    pub update: bool,
    /// Print the message of the day before running.
    pub show_motd: bool,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            owner: DEFAULT_OWNER_NAMESPACE.to_string(),
            notebook_port: DEFAULT_NOTEBOOK_PORT,
            engine_timeout: None,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            interface: DEFAULT_INTERFACE.to_string(),
            workdir: PathBuf::from("."),
            tty: true,
            update: true,
            show_motd: true,
        }
    }
}

pub fn parse_port(s: &str) -> Result<u16, LaunchError> {
    match s.trim().parse::<u16>() {
        Ok(p) if p > 0 => Ok(p),
        _ => Err(LaunchError::Config(format!(
            "port must be a number between 1 and 65535, got '{}'",
            s.trim()
        ))),
    }
}

/// Human-readable duration (`90s`, `10m`); `0s` disables the bound.
pub fn parse_timeout(s: &str) -> Result<Option<Duration>, LaunchError> {
    let d = humantime::parse_duration(s.trim())
        .map_err(|e| LaunchError::Config(format!("invalid timeout '{}': {e}", s.trim())))?;
    Ok(if d.is_zero() { None } else { Some(d) })
}

impl LaunchConfig {
    /// Resolve settings through `lookup` (an environment accessor).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, LaunchError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut cfg = LaunchConfig::default();
        if let Some(owner) = get("MINIAN_DOCKER_OWNER") {
            cfg.owner = owner;
        }
        if let Some(port) = get("MINIAN_NOTEBOOK_PORT") {
            cfg.notebook_port = parse_port(&port)?;
        }
        if let Some(t) = get("MINIAN_DOCKER_TIMEOUT") {
            cfg.engine_timeout = parse_timeout(&t)?;
        }
        if let Some(t) = get("MINIAN_DOCKER_PROBE_TIMEOUT") {
            cfg.probe_timeout = parse_timeout(&t)?.unwrap_or(Duration::ZERO);
        }
        if let Some(iface) = get("MINIAN_DOCKER_INTERFACE") {
            cfg.interface = iface;
        }
        Ok(cfg)
    }

    /// Settings from the process environment, the canonical current directory and TTY state.
    pub fn from_env() -> Result<Self, LaunchError> {
        let mut cfg = Self::from_lookup(|k| env::var(k).ok())?;
        let pwd = env::current_dir()
            .map_err(|e| LaunchError::Config(format!("cannot determine current directory: {e}")))?;
        cfg.workdir = fs::canonicalize(&pwd).unwrap_or(pwd);
        // docker refuses `-t` unless its own stdin is a terminal.
        cfg.tty = atty::is(atty::Stream::Stdin);
        Ok(cfg)
    }
}
