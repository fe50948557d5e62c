#![allow(clippy::module_name_repetitions)]
//! Container engine collaborator: `pull`, `build` (recipe on stdin) and `run`.

use std::cell::RefCell;
use std::path::PathBuf;
use std::time::Duration;

use crate::color::{color_enabled_stderr, log_info_stderr};
use crate::errors::LaunchError;
use crate::util::{shell_join, ExecRequest, ExecService};

/// Outcome of one engine invocation; `None` means the process was killed by a signal.
pub type ExitCode = Option<i32>;

pub trait ContainerEngine {
    fn pull(&self, image: &str) -> Result<ExitCode, LaunchError>;
    fn build(&self, tag: &str, recipe: &str) -> Result<ExitCode, LaunchError>;
    fn run(&self, args: &[String]) -> Result<ExitCode, LaunchError>;
}

/// The `docker` CLI. Output streams straight to the terminal; `run` is never timed out.
#[derive(Debug, Clone)]
pub struct DockerCli {
    runtime: PathBuf,
    exec: ExecService,
}

impl DockerCli {
    /// `timeout` bounds `pull` and `build`; `None` waits indefinitely.
    pub fn new(runtime: PathBuf, timeout: Option<Duration>) -> Self {
        Self {
            runtime,
            exec: ExecService::new(timeout.unwrap_or(Duration::ZERO)),
        }
    }

    fn invoke(&self, request: ExecRequest) -> Result<ExitCode, LaunchError> {
        let out = self.exec.run(request.inherit_env(true))?;
        Ok(out.status.code())
    }
}

impl ContainerEngine for DockerCli {
    fn pull(&self, image: &str) -> Result<ExitCode, LaunchError> {
        self.invoke(ExecRequest::new(&self.runtime).args(["pull", image]))
    }

    fn build(&self, tag: &str, recipe: &str) -> Result<ExitCode, LaunchError> {
        self.invoke(
            ExecRequest::new(&self.runtime)
                .args(["build", "-t", tag, "-"])
                .stdin(recipe),
        )
    }

    fn run(&self, args: &[String]) -> Result<ExitCode, LaunchError> {
        self.invoke(
            ExecRequest::new(&self.runtime)
                .arg("run")
                .args(args)
                .timeout(Duration::ZERO),
        )
    }
}

/// Dry-run engine: prints each invocation to stderr, executes nothing, always succeeds.
#[derive(Debug, Default)]
pub struct PreviewEngine {
    issued: RefCell<Vec<Vec<String>>>,
}

impl PreviewEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invocations previewed so far, each starting with `docker`.
    pub fn issued(&self) -> Vec<Vec<String>> {
        self.issued.borrow().clone()
    }

    fn preview(&self, words: Vec<String>) -> ExitCode {
        log_info_stderr(
            color_enabled_stderr(),
            &format!("minian-docker: docker: {}", shell_join(&words)),
        );
        self.issued.borrow_mut().push(words);
        Some(0)
    }
}

impl ContainerEngine for PreviewEngine {
    fn pull(&self, image: &str) -> Result<ExitCode, LaunchError> {
        Ok(self.preview(vec!["docker".into(), "pull".into(), image.into()]))
    }

    fn build(&self, tag: &str, _recipe: &str) -> Result<ExitCode, LaunchError> {
        Ok(self.preview(vec![
            "docker".into(),
            "build".into(),
            "-t".into(),
            tag.into(),
            "-".into(),
        ]))
    }

    fn run(&self, args: &[String]) -> Result<ExitCode, LaunchError> {
        let mut words = vec!["docker".to_string(), "run".to_string()];
        words.extend(args.iter().cloned());
        Ok(self.preview(words))
    }
}
