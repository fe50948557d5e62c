//! Error mapping guide:
//! - Every failure of the launch sequence is terminal; callers log the Display text once and exit.
//! - Map a missing container engine (and io::ErrorKind::NotFound) to exit code 127; all others to 1.
//! - Process plumbing inside util::exec uses anyhow; convert at the engine/probe seam via LaunchError::Exec.
use std::fmt;
use std::io;

use crate::launcher::LaunchState;

/// Failures of a single `update -> build -> run` launch.
#[derive(Debug)]
pub enum LaunchError {
    /// The requested container kind is not one of bash, notebook or gui.
    UnsupportedContainerKind(String),
    /// The host operating system is not windows, linux or macos.
    UnknownPlatform(String),
    /// `id` returned no usable username/uid/group/gid.
    IdentityProbeFailed(String),
    /// X11 forwarding was required but no display is configured on the host.
    DisplayUnavailable(String),
    /// The host's network interface address could not be determined (macOS forwarding).
    InterfaceProbeFailed(String),
    PullFailed { image: String, code: Option<i32> },
    BuildFailed { tag: String, code: Option<i32> },
    RunFailed { image: String, code: Option<i32> },
    /// The container engine binary is not on PATH.
    RuntimeNotFound(String),
    /// Spawning or waiting on an external process failed.
    Exec(String),
    /// Invalid setting from the environment or the command line.
    Config(String),
    /// A stage was invoked out of sequence.
    OutOfOrder { from: LaunchState, to: LaunchState },
}

fn code_suffix(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!(" (exit code {c})"),
        None => " (terminated by signal)".to_string(),
    }
}

impl fmt::Display for LaunchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchError::UnsupportedContainerKind(kind) => write!(
                f,
                "unsupported container kind '{kind}': expected one of bash, notebook, gui"
            ),
            LaunchError::UnknownPlatform(os) => write!(f, "unknown platform '{os}'"),
            LaunchError::IdentityProbeFailed(msg) => {
                write!(f, "failed to determine host identity: {msg}")
            }
            LaunchError::DisplayUnavailable(msg) => {
                write!(f, "display forwarding unavailable: {msg}")
            }
            LaunchError::InterfaceProbeFailed(msg) => {
                write!(f, "failed to determine host interface address: {msg}")
            }
            LaunchError::PullFailed { image, code } => write!(
                f,
                "failed updating docker image for {image}{}",
                code_suffix(code)
            ),
            LaunchError::BuildFailed { tag, code } => {
                write!(f, "build of {tag} failed{}", code_suffix(code))
            }
            LaunchError::RunFailed { image, code } => write!(
                f,
                "failed to launch {image} in docker{}",
                code_suffix(code)
            ),
            LaunchError::RuntimeNotFound(msg) => f.write_str(msg),
            LaunchError::Exec(msg) => f.write_str(msg),
            LaunchError::Config(msg) => write!(f, "invalid configuration: {msg}"),
            LaunchError::OutOfOrder { from, to } => {
                write!(f, "cannot move from {from} to {to}")
            }
        }
    }
}

impl std::error::Error for LaunchError {}

impl From<anyhow::Error> for LaunchError {
    fn from(e: anyhow::Error) -> Self {
        LaunchError::Exec(format!("{e:#}"))
    }
}

impl From<io::Error> for LaunchError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::NotFound {
            LaunchError::RuntimeNotFound(e.to_string())
        } else {
            LaunchError::Exec(e.to_string())
        }
    }
}

impl LaunchError {
    /// Prefix process-level failures with the launch stage they interrupted.
    pub fn in_stage(self, stage: &str) -> Self {
        match self {
            LaunchError::Exec(msg) => LaunchError::Exec(format!("{stage} stage: {msg}")),
            LaunchError::RuntimeNotFound(msg) => {
                LaunchError::RuntimeNotFound(format!("{stage} stage: {msg}"))
            }
            other => other,
        }
    }
}

/// Map a LaunchError to a process exit code:
/// - 127 when the container engine is missing (command not found)
/// - 1 for all other errors
pub fn exit_code_for_launch_error(e: &LaunchError) -> u8 {
    match e {
        LaunchError::RuntimeNotFound(_) => 127,
        _ => 1,
    }
}
