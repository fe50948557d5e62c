#![allow(clippy::module_name_repetitions)]
//! `docker run` argument assembly.
//!
//! The engine parses flags relative to the image reference, so the sections are emitted in
//! a fixed order: interactive flags, mounts, display forwarding, ports, image, exec command.

use std::path::Path;

use crate::docker::images::{ContainerKind, ImageNames};
use crate::platform::Platform;

/// Container directory the host working directory is mounted at.
pub const CONTAINER_WORKDIR: &str = "/app";
/// Port the notebook server listens on inside the container.
pub const NOTEBOOK_CONTAINER_PORT: u16 = 8000;
/// Sample application started by the `gui` kind.
pub const GUI_SAMPLE_COMMAND: [&str; 2] = ["python", "minian_docker/gui/sample.py"];

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct RunArgs {
    pub base: Vec<String>,
    pub mounts: Vec<String>,
    pub display: Vec<String>,
    pub ports: Vec<String>,
    pub image: String,
    pub exec: Vec<String>,
}

impl RunArgs {
    /// Arguments following `docker run`, in engine order.
    pub fn to_vec(&self) -> Vec<String> {
        let mut out = Vec::new();
        out.extend(self.base.iter().cloned());
        out.extend(self.mounts.iter().cloned());
        out.extend(self.display.iter().cloned());
        out.extend(self.ports.iter().cloned());
        out.push(self.image.clone());
        out.extend(self.exec.iter().cloned());
        out
    }
}

/// Interactive + ephemeral flags; a pseudo-TTY is only requested when one is attached.
pub fn base_flags(tty: bool) -> Vec<String> {
    let interactive = if tty { "-it" } else { "-i" };
    vec![interactive.to_string(), "--rm".to_string()]
}

/// Bind the host working directory to `/app` and make it the container working directory.
pub fn mount_flags(workdir: &Path) -> Vec<String> {
    vec![
        "-v".to_string(),
        format!("{}:{CONTAINER_WORKDIR}", workdir.display()),
        "-w".to_string(),
        CONTAINER_WORKDIR.to_string(),
    ]
}

/// Notebook kind only: publish the server on the host loopback interface.
pub fn port_flags(kind: ContainerKind, host_port: u16) -> Vec<String> {
    match kind {
        ContainerKind::Notebook => vec![
            "-p".to_string(),
            format!("127.0.0.1:{host_port}:{NOTEBOOK_CONTAINER_PORT}"),
        ],
        ContainerKind::Bash | ContainerKind::Gui => Vec::new(),
    }
}

/// On windows nothing was rebuilt locally, so the remote image is run directly.
pub fn image_reference(platform: Platform, images: &ImageNames) -> String {
    match platform {
        Platform::Windows => images.remote.clone(),
        Platform::Linux | Platform::Macos => images.local.clone(),
    }
}

/// Trailing command; the notebook image runs its default entrypoint.
pub fn exec_command(kind: ContainerKind) -> Vec<String> {
    match kind {
        ContainerKind::Bash => vec!["bash".to_string()],
        ContainerKind::Gui => GUI_SAMPLE_COMMAND.iter().map(|s| s.to_string()).collect(),
        ContainerKind::Notebook => Vec::new(),
    }
}

pub struct RunInputs<'a> {
    pub kind: ContainerKind,
    pub platform: Platform,
    pub images: &'a ImageNames,
    pub workdir: &'a Path,
    pub tty: bool,
    pub notebook_port: u16,
    pub display: Vec<String>,
}

pub fn assemble(inputs: RunInputs<'_>) -> RunArgs {
    RunArgs {
        base: base_flags(inputs.tty),
        mounts: mount_flags(inputs.workdir),
        display: inputs.display,
        ports: port_flags(inputs.kind, inputs.notebook_port),
        image: image_reference(inputs.platform, inputs.images),
        exec: exec_command(inputs.kind),
    }
}
