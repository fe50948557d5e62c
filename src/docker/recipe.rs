#![allow(clippy::module_name_repetitions)]
//! Build recipe (Dockerfile) that adapts a remote image to the host user.
//!
//! Invariants:
//! - Exactly one `FROM`, first.
//! - `/home` and `/app` are created before anything is chowned.
//! - Group creation tolerates an existing gid (`groupadd || groupmod -o`).
//! - `USER` is the last instruction.

use std::fmt;

use crate::host::HostInfo;

/// Directories shared with the host user inside the image.
pub const SHARED_DIRS: [&str; 2] = ["/home", "/app"];

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Instruction {
    From(String),
    Run(String),
    User(String),
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::From(image) => write!(f, "FROM {image}"),
            Instruction::Run(cmd) => write!(f, "RUN {cmd}"),
            Instruction::User(user) => write!(f, "USER {user}"),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct BuildRecipe {
    instructions: Vec<Instruction>,
}

impl BuildRecipe {
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Dockerfile text, one instruction per line, newline-terminated.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for ins in &self.instructions {
            out.push_str(&ins.to_string());
            out.push('\n');
        }
        out
    }
}

/// Recipe that creates the host's group and user inside `remote`, hands the shared
/// directories to them and makes them the default user.
pub fn generate(remote: &str, host: &HostInfo) -> BuildRecipe {
    let HostInfo {
        username,
        uid,
        groupname,
        gid,
    } = host;

    let mut instructions = vec![Instruction::From(remote.to_string())];
    for dir in SHARED_DIRS {
        instructions.push(Instruction::Run(format!("mkdir -p {dir}")));
    }
    instructions.push(Instruction::Run(format!(
        "groupadd -g {gid} {groupname} || groupmod -og {gid} {groupname}"
    )));
    instructions.push(Instruction::Run(format!(
        "useradd -d /home -s /bin/bash -u {uid} -g {gid} {username}"
    )));
    for dir in SHARED_DIRS {
        instructions.push(Instruction::Run(format!(
            "chown -R {username}:{groupname} {dir}"
        )));
    }
    instructions.push(Instruction::User(username.clone()));

    BuildRecipe { instructions }
}
