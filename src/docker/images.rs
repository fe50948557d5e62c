#![allow(clippy::module_name_repetitions)]
//! Container kinds and image naming.

use std::fmt;
use std::str::FromStr;

use crate::errors::LaunchError;

/// Docker Hub namespace the prebuilt images are published under.
pub const DEFAULT_OWNER_NAMESPACE: &str = "velonica2227";

/// Launch mode requested on the command line.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ContainerKind {
    Bash,
    Notebook,
    Gui,
}

impl ContainerKind {
    pub const ALL: [ContainerKind; 3] =
        [ContainerKind::Bash, ContainerKind::Notebook, ContainerKind::Gui];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerKind::Bash => "bash",
            ContainerKind::Notebook => "notebook",
            ContainerKind::Gui => "gui",
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContainerKind {
    type Err = LaunchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContainerKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| LaunchError::UnsupportedContainerKind(s.to_string()))
    }
}

/// Remote (registry) and local (rebuilt) image names for one container kind.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ImageNames {
    pub remote: String,
    pub local: String,
}

/// Local name is `minian-docker-base` for bash and `minian-docker-<kind>` otherwise;
/// the remote name prefixes it with the owner namespace.
pub fn resolve(kind: ContainerKind, owner: &str) -> ImageNames {
    let local = match kind {
        ContainerKind::Bash => "minian-docker-base".to_string(),
        other => format!("minian-docker-{other}"),
    };
    ImageNames {
        remote: format!("{owner}/{local}"),
        local,
    }
}
