#![allow(dead_code)]

use std::cell::RefCell;
use std::path::PathBuf;

use minian_docker::docker::ExitCode;
use minian_docker::{
    Collaborators, ContainerEngine, DisplayEnv, HostInfo, IdentityProbe, InterfaceProbe,
    LaunchConfig, LaunchError, LogSink,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Pull(String),
    Build { tag: String, recipe: String },
    Run(Vec<String>),
}

/// Engine double: records every call and answers with preset exit codes.
pub struct RecordingEngine {
    pub calls: RefCell<Vec<Call>>,
    pub pull_code: ExitCode,
    pub build_code: ExitCode,
    pub run_code: ExitCode,
    /// When set, every call fails as if the engine binary could not be spawned.
    pub spawn_failure: bool,
}

impl RecordingEngine {
    pub fn ok() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            pull_code: Some(0),
            build_code: Some(0),
            run_code: Some(0),
            spawn_failure: false,
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn builds(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Build { .. }))
            .count()
    }

    pub fn run_args(&self) -> Option<Vec<String>> {
        self.calls().into_iter().find_map(|c| match c {
            Call::Run(args) => Some(args),
            _ => None,
        })
    }
}

impl RecordingEngine {
    fn answer(&self, code: ExitCode) -> Result<ExitCode, LaunchError> {
        if self.spawn_failure {
            return Err(LaunchError::Exec("failed to spawn \"docker\"".into()));
        }
        Ok(code)
    }
}

impl ContainerEngine for RecordingEngine {
    fn pull(&self, image: &str) -> Result<ExitCode, LaunchError> {
        self.calls.borrow_mut().push(Call::Pull(image.to_string()));
        self.answer(self.pull_code)
    }

    fn build(&self, tag: &str, recipe: &str) -> Result<ExitCode, LaunchError> {
        self.calls.borrow_mut().push(Call::Build {
            tag: tag.to_string(),
            recipe: recipe.to_string(),
        });
        self.answer(self.build_code)
    }

    fn run(&self, args: &[String]) -> Result<ExitCode, LaunchError> {
        self.calls.borrow_mut().push(Call::Run(args.to_vec()));
        self.answer(self.run_code)
    }
}

pub struct FixedIdentity(pub Result<HostInfo, String>);

impl FixedIdentity {
    pub fn alice() -> Self {
        FixedIdentity(Ok(alice()))
    }
}

impl IdentityProbe for FixedIdentity {
    fn fetch(&self) -> Result<HostInfo, LaunchError> {
        self.0
            .clone()
            .map_err(LaunchError::IdentityProbeFailed)
    }
}

pub struct FixedInterface(pub Option<&'static str>);

impl InterfaceProbe for FixedInterface {
    fn primary_ipv4(&self) -> Result<String, LaunchError> {
        self.0
            .map(str::to_string)
            .ok_or_else(|| LaunchError::InterfaceProbeFailed("no inet address on en0".into()))
    }
}

pub fn alice() -> HostInfo {
    HostInfo {
        username: "alice".into(),
        uid: 1000,
        groupname: "staff".into(),
        gid: 1001,
    }
}

pub fn test_config() -> LaunchConfig {
    LaunchConfig {
        workdir: PathBuf::from("/work/project"),
        show_motd: false,
        ..LaunchConfig::default()
    }
}

pub fn linux_display() -> DisplayEnv {
    DisplayEnv {
        display: Some(":1".into()),
        xauthority: Some(PathBuf::from("/home/u/.Xauthority")),
    }
}

pub fn deps<'a>(
    engine: &'a dyn ContainerEngine,
    identity: &'a dyn IdentityProbe,
    interfaces: &'a dyn InterfaceProbe,
    log: &'a dyn LogSink,
) -> Collaborators<'a> {
    Collaborators {
        engine,
        identity,
        interfaces,
        log,
    }
}
