//! X11 display forwarding flags per platform.
//!
//! - windows: unsupported, no flags.
//! - linux: `DISPLAY=unix<display>`, the X11 socket directory and the Xauthority cookie.
//! - macos: `DISPLAY=<interface ip><:display>` pointing at the host's XQuartz over TCP.
//!
//! Only the `gui` kind treats missing display information as fatal; shells and notebooks
//! start without forwarding and a warning.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::docker::ContainerKind;
use crate::errors::LaunchError;
use crate::logging::LogSink;
use crate::platform::Platform;
use crate::util::{ExecRequest, ExecService};

pub const X11_SOCKET_DIR: &str = "/tmp/.X11-unix";
/// Where the host's Xauthority cookie is mounted inside the container.
pub const CONTAINER_XAUTHORITY: &str = "/home/developer/.Xauthority";

static DISPLAY_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^.*?(:[0-9]+(?:\.[0-9]+)?)$").expect("display suffix pattern"));

/// Display-related host environment, captured once per launch.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct DisplayEnv {
    pub display: Option<String>,
    pub xauthority: Option<PathBuf>,
}

impl DisplayEnv {
    /// `DISPLAY` and `XAUTHORITY`; the latter falls back to `~/.Xauthority`.
    pub fn from_env() -> Self {
        Self::from_parts(
            env::var("DISPLAY").ok(),
            env::var_os("XAUTHORITY"),
            home::home_dir().as_deref(),
        )
    }

    /// The cookie is only kept if it is an existing file: docker would create a missing
    /// bind-mount source as a root-owned directory.
    pub fn from_parts(
        display: Option<String>,
        xauthority: Option<OsString>,
        home: Option<&Path>,
    ) -> Self {
        let display = display
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let xauthority = xauthority
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .filter(|p| p.is_file())
            .or_else(|| home.map(|h| h.join(".Xauthority")).filter(|p| p.is_file()));
        Self {
            display,
            xauthority,
        }
    }
}

/// Display number (and optional screen) at the end of a `DISPLAY` value, e.g. `:0` in
/// `/private/tmp/com.apple.launchd.abc/org.xquartz:0`.
pub fn display_suffix(display: &str) -> Option<&str> {
    DISPLAY_SUFFIX
        .captures(display)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Reachable IPv4 address of the host, as seen from a container.
pub trait InterfaceProbe {
    fn primary_ipv4(&self) -> Result<String, LaunchError>;
}

/// `ifconfig <iface> | grep inet | awk '$1=="inet" {print $2}'`, first address wins.
#[derive(Debug, Clone)]
pub struct IfconfigProbe {
    interface: String,
    exec: ExecService,
}

impl IfconfigProbe {
    pub fn new(interface: impl Into<String>, timeout: Duration) -> Self {
        Self {
            interface: interface.into(),
            exec: ExecService::new(timeout),
        }
    }
}

impl InterfaceProbe for IfconfigProbe {
    fn primary_ipv4(&self) -> Result<String, LaunchError> {
        let out = self
            .exec
            .pipeline(vec![
                ExecRequest::new("ifconfig")
                    .arg(&self.interface)
                    .inherit_env(true),
                ExecRequest::new("grep").arg("inet").inherit_env(true),
                ExecRequest::new("awk")
                    .arg(r#"$1=="inet" {print $2}"#)
                    .inherit_env(true),
            ])
            .map_err(|e| LaunchError::InterfaceProbeFailed(format!("{}: {e:#}", self.interface)))?;
        out.stdout
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                LaunchError::InterfaceProbeFailed(format!(
                    "no inet address on {}",
                    self.interface
                ))
            })
    }
}

fn linux_flags(env: &DisplayEnv, log: &dyn LogSink) -> Result<Vec<String>, LaunchError> {
    let display = env
        .display
        .as_deref()
        .ok_or_else(|| LaunchError::DisplayUnavailable("DISPLAY is not set".to_string()))?;
    let mut flags = vec![
        "-e".to_string(),
        format!("DISPLAY=unix{display}"),
        "-v".to_string(),
        format!("{X11_SOCKET_DIR}:{X11_SOCKET_DIR}"),
    ];
    match &env.xauthority {
        Some(path) => {
            flags.push("-v".to_string());
            flags.push(format!("{}:{CONTAINER_XAUTHORITY}", path.display()));
        }
        None => log.warn("no Xauthority file found; not mounting an X11 cookie"),
    }
    Ok(flags)
}

fn macos_flags(
    env: &DisplayEnv,
    interfaces: &dyn InterfaceProbe,
    log: &dyn LogSink,
) -> Result<Vec<String>, LaunchError> {
    log.info("using macOS display forwarding");
    let display = env
        .display
        .as_deref()
        .ok_or_else(|| LaunchError::DisplayUnavailable("DISPLAY is not set".to_string()))?;
    let suffix = display_suffix(display).ok_or_else(|| {
        LaunchError::DisplayUnavailable(format!("cannot find a display number in DISPLAY={display}"))
    })?;
    let ip = interfaces.primary_ipv4()?;
    Ok(vec!["-e".to_string(), format!("DISPLAY={ip}{suffix}")])
}

/// Display-forwarding flags for `docker run`.
pub fn forwarding_flags(
    platform: Platform,
    kind: ContainerKind,
    env: &DisplayEnv,
    interfaces: &dyn InterfaceProbe,
    log: &dyn LogSink,
) -> Result<Vec<String>, LaunchError> {
    let result = match platform {
        Platform::Windows => {
            log.info("display forwarding is not supported on windows; starting without it");
            return Ok(Vec::new());
        }
        Platform::Linux => linux_flags(env, log),
        Platform::Macos => macos_flags(env, interfaces, log),
    };
    match result {
        Ok(flags) => Ok(flags),
        Err(e) if kind != ContainerKind::Gui => {
            log.warn(&format!("{e}; starting without display forwarding"));
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}
