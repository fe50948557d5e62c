//! Launcher for the MiniAn scientific-computing containers.
//!
//! A launch pulls the published image, rebuilds it so that the container user matches the
//! host uid/gid (files written to the mounted working directory stay owned by the host
//! user), and runs it as a shell, notebook server or X11 GUI session.

pub mod banner;
pub mod color;
pub mod config;
pub mod display;
pub mod docker;
pub mod errors;
pub mod host;
pub mod launcher;
pub mod logging;
pub mod platform;
pub mod util;

pub use color::{color_enabled_stderr, set_color_mode, ColorMode};
pub use config::LaunchConfig;
pub use display::{DisplayEnv, IfconfigProbe, InterfaceProbe};
pub use docker::{
    container_runtime_path, ContainerEngine, ContainerKind, DockerCli, ImageNames, PreviewEngine,
};
pub use errors::{exit_code_for_launch_error, LaunchError};
pub use host::{HostInfo, IdCommandProbe, IdentityProbe};
pub use launcher::{Collaborators, LaunchState, Launcher};
pub use logging::{LogSink, MemorySink, TracingSink};
pub use platform::Platform;
pub use util::{shell_escape, shell_join};
