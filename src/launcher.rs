//! Launch sequence: update (pull) -> build (host-adapted image) -> run.
//!
//! States only move forward: `Idle -> Updating -> Building -> Running -> Done`. The first
//! failure moves the launcher to `Aborted`; nothing is retried or rolled back.

use std::fmt;

use crate::banner::print_motd;
use crate::config::LaunchConfig;
use crate::display::{forwarding_flags, DisplayEnv, InterfaceProbe};
use crate::docker::{
    self, recipe, run, ContainerEngine, ContainerKind, ExitCode, ImageNames, RunArgs,
};
use crate::errors::LaunchError;
use crate::host::IdentityProbe;
use crate::logging::LogSink;
use crate::platform::Platform;
use crate::util::shell_join;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum LaunchState {
    Idle,
    Updating,
    Building,
    Running,
    Done,
    Aborted,
}

impl LaunchState {
    fn predecessor(self) -> Option<LaunchState> {
        match self {
            LaunchState::Updating => Some(LaunchState::Idle),
            LaunchState::Building => Some(LaunchState::Updating),
            LaunchState::Running => Some(LaunchState::Building),
            LaunchState::Done => Some(LaunchState::Running),
            LaunchState::Idle | LaunchState::Aborted => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, LaunchState::Done | LaunchState::Aborted)
    }
}

impl fmt::Display for LaunchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LaunchState::Idle => "idle",
            LaunchState::Updating => "updating",
            LaunchState::Building => "building",
            LaunchState::Running => "running",
            LaunchState::Done => "done",
            LaunchState::Aborted => "aborted",
        };
        f.write_str(s)
    }
}

/// External collaborators of a launch.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub engine: &'a dyn ContainerEngine,
    pub identity: &'a dyn IdentityProbe,
    pub interfaces: &'a dyn InterfaceProbe,
    pub log: &'a dyn LogSink,
}

pub struct Launcher<'a> {
    kind: ContainerKind,
    platform: Platform,
    images: ImageNames,
    config: LaunchConfig,
    display: DisplayEnv,
    deps: Collaborators<'a>,
    state: LaunchState,
}

fn require_success(code: ExitCode, err: impl FnOnce(ExitCode) -> LaunchError) -> Result<(), LaunchError> {
    if code == Some(0) {
        Ok(())
    } else {
        Err(err(code))
    }
}

impl<'a> Launcher<'a> {
    /// Validates `kind` before anything else happens; an unsupported kind launches no process.
    pub fn new(
        kind: &str,
        platform: Platform,
        config: LaunchConfig,
        display: DisplayEnv,
        deps: Collaborators<'a>,
    ) -> Result<Self, LaunchError> {
        let kind: ContainerKind = kind.parse()?;
        let images = docker::resolve(kind, &config.owner);
        Ok(Self {
            kind,
            platform,
            images,
            config,
            display,
            deps,
            state: LaunchState::Idle,
        })
    }

    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    pub fn images(&self) -> &ImageNames {
        &self.images
    }

    pub fn state(&self) -> LaunchState {
        self.state
    }

    /// Run all three stages, stopping at the first failure.
    pub fn launch(&mut self) -> Result<(), LaunchError> {
        self.update()?;
        self.build()?;
        self.run()
    }

    /// Pull the remote image.
    pub fn update(&mut self) -> Result<(), LaunchError> {
        let result = self.enter(LaunchState::Updating).and_then(|()| self.pull());
        self.settle(result)
    }

    /// Rebuild the remote image for the host user; skipped on windows.
    pub fn build(&mut self) -> Result<(), LaunchError> {
        let result = self
            .enter(LaunchState::Building)
            .and_then(|()| self.build_local_image());
        self.settle(result)
    }

    /// Assemble the run arguments and hand the terminal to the container until it exits.
    pub fn run(&mut self) -> Result<(), LaunchError> {
        let result = self
            .enter(LaunchState::Running)
            .and_then(|()| self.run_container());
        let result = self.settle(result);
        if result.is_ok() {
            self.state = LaunchState::Done;
        }
        result
    }

    /// `docker run` arguments for the current kind and platform.
    pub fn run_args(&self) -> Result<RunArgs, LaunchError> {
        let display = forwarding_flags(
            self.platform,
            self.kind,
            &self.display,
            self.deps.interfaces,
            self.deps.log,
        )?;
        Ok(run::assemble(run::RunInputs {
            kind: self.kind,
            platform: self.platform,
            images: &self.images,
            workdir: &self.config.workdir,
            tty: self.config.tty,
            notebook_port: self.config.notebook_port,
            display,
        }))
    }

    fn enter(&mut self, to: LaunchState) -> Result<(), LaunchError> {
        if to.predecessor() != Some(self.state) {
            return Err(LaunchError::OutOfOrder {
                from: self.state,
                to,
            });
        }
        self.state = to;
        Ok(())
    }

    fn settle(&mut self, result: Result<(), LaunchError>) -> Result<(), LaunchError> {
        if let Err(e) = &result {
            self.deps.log.error(&e.to_string());
            if !self.state.is_terminal() {
                self.state = LaunchState::Aborted;
            }
        }
        result
    }

    fn pull(&self) -> Result<(), LaunchError> {
        let image = &self.images.remote;
        if !self.config.update {
            self.deps
                .log
                .info(&format!("Skipping update of docker image {image}"));
            return Ok(());
        }
        self.deps
            .log
            .info(&format!("Update or fetching Docker image for {image}"));
        let code = self
            .deps
            .engine
            .pull(image)
            .map_err(|e| e.in_stage("update"))?;
        require_success(code, |code| LaunchError::PullFailed {
            image: image.clone(),
            code,
        })
    }

    fn build_local_image(&self) -> Result<(), LaunchError> {
        match self.platform {
            Platform::Windows => {
                self.deps
                    .log
                    .info("Skipping local build on windows; running the published image");
                Ok(())
            }
            Platform::Linux | Platform::Macos => {
                let host = self.deps.identity.fetch()?;
                self.deps.log.info(&format!(
                    "Configuring a local container for user {} ({}) in group {} ({})",
                    host.username, host.uid, host.groupname, host.gid
                ));
                let recipe = recipe::generate(&self.images.remote, &host).render();
                self.deps.log.debug(&format!("build recipe:\n{recipe}"));
                let tag = &self.images.local;
                let code = self
                    .deps
                    .engine
                    .build(tag, &recipe)
                    .map_err(|e| e.in_stage("build"))?;
                require_success(code, |code| LaunchError::BuildFailed {
                    tag: tag.clone(),
                    code,
                })?;
                self.deps.log.info("Build succeeded.");
                Ok(())
            }
        }
    }

    fn run_container(&self) -> Result<(), LaunchError> {
        self.deps.log.info(&format!(
            "Mounted current directory: {}",
            self.config.workdir.display()
        ));
        let args = self.run_args()?;
        let argv = args.to_vec();
        self.deps
            .log
            .info(&format!("docker run {}", shell_join(&argv)));
        if self.config.show_motd {
            print_motd();
        }
        let code = self
            .deps
            .engine
            .run(&argv)
            .map_err(|e| e.in_stage("run"))?;
        require_success(code, |code| LaunchError::RunFailed {
            image: args.image.clone(),
            code,
        })
    }
}
