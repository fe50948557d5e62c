use std::collections::BTreeSet;
use std::ffi::OsString;
use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use wait_timeout::ChildExt;

/// Structured command execution with optional timeouts, stdin feeding and environment filtering.
///
/// A zero timeout means "wait indefinitely".
#[derive(Debug, Clone)]
pub struct ExecService {
    allowed_env: Option<BTreeSet<String>>,
    default_timeout: Duration,
}

impl ExecService {
    pub fn new(default_timeout: Duration) -> Self {
        Self {
            allowed_env: None,
            default_timeout,
        }
    }

    pub fn with_allowed_env<I, S>(default_timeout: Duration, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set = allowed.into_iter().map(Into::into).collect();
        Self {
            allowed_env: Some(set),
            default_timeout,
        }
    }

    pub fn run(&self, request: ExecRequest) -> Result<ExecOutput> {
        let mut cmd = Command::new(&request.program);
        for arg in &request.args {
            cmd.arg(arg);
        }
        if !request.inherit_env || self.allowed_env.is_some() {
            cmd.env_clear();
        }

        if let Some(allowed) = &self.allowed_env {
            for (key, value) in std::env::vars_os() {
                if let Ok(k) = key.clone().into_string() {
                    if allowed.contains(&k) {
                        cmd.env(&key, &value);
                    }
                }
            }
        } else if request.inherit_env {
            for (key, value) in std::env::vars_os() {
                cmd.env(&key, &value);
            }
        }

        if request.capture_output {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        }
        if request.stdin.is_some() {
            cmd.stdin(Stdio::piped());
        }

        let mut child = cmd.spawn().with_context(|| {
            format!(
                "failed to spawn {:?} with args {:?}",
                request.program, request.args
            )
        })?;

        // stdin and the captured streams are serviced on threads; a full pipe must never
        // stall the wait below.
        let writer = match (request.stdin, child.stdin.take()) {
            (Some(data), Some(mut pipe)) => Some(thread::spawn(move || {
                // Dropping the pipe closes it so the child sees EOF.
                match pipe.write_all(&data) {
                    Err(e) if e.kind() != io::ErrorKind::BrokenPipe => Err(e),
                    _ => Ok(()),
                }
            })),
            _ => None,
        };
        let stdout_reader = child.stdout.take().map(spawn_reader);
        let stderr_reader = child.stderr.take().map(spawn_reader);

        let timeout = request.timeout.unwrap_or(self.default_timeout);
        let status = if timeout.is_zero() {
            child.wait().context("failed to wait for process")?
        } else {
            match child
                .wait_timeout(timeout)
                .context("failed to wait with timeout")?
            {
                Some(status) => status,
                None => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(anyhow!(
                        "command {:?} timed out after {}",
                        request.program,
                        humantime::format_duration(timeout)
                    ));
                }
            }
        };

        if let Some(writer) = writer {
            join_io(writer)
                .with_context(|| format!("failed to write stdin of {:?}", request.program))?;
        }
        let stdout = match stdout_reader {
            Some(reader) => join_io(reader).context("failed to read process output")?,
            None => String::new(),
        };
        let stderr = match stderr_reader {
            Some(reader) => join_io(reader).context("failed to read process output")?,
            None => String::new(),
        };

        Ok(ExecOutput {
            status,
            stdout,
            stderr,
        })
    }

    /// Run `stages` in order, feeding each stage's captured stdout to the next stage's stdin.
    ///
    /// Every stage must exit successfully; the first failing stage aborts the pipeline.
    pub fn pipeline(&self, stages: Vec<ExecRequest>) -> Result<ExecOutput> {
        let mut last: Option<ExecOutput> = None;
        for mut stage in stages {
            if let Some(prev) = last.take() {
                stage.stdin = Some(prev.stdout.into_bytes());
            }
            stage.capture_output = true;
            let program = stage.program.clone();
            let out = self.run(stage)?;
            if !out.status.success() {
                bail!(
                    "pipeline stage {:?} exited with {}{}",
                    program,
                    out.status,
                    if out.stderr.trim().is_empty() {
                        String::new()
                    } else {
                        format!(": {}", out.stderr.trim())
                    }
                );
            }
            last = Some(out);
        }
        last.ok_or_else(|| anyhow!("empty pipeline"))
    }
}

fn spawn_reader<R: io::Read + Send + 'static>(mut stream: R) -> JoinHandle<io::Result<String>> {
    thread::spawn(move || {
        let mut buf = String::new();
        stream.read_to_string(&mut buf)?;
        Ok(buf)
    })
}

fn join_io<T>(handle: JoinHandle<io::Result<T>>) -> Result<T> {
    handle
        .join()
        .map_err(|_| anyhow!("i/o thread panicked"))?
        .map_err(Into::into)
}

#[derive(Debug, Default)]
pub struct ExecRequest {
    program: OsString,
    args: Vec<OsString>,
    inherit_env: bool,
    timeout: Option<Duration>,
    capture_output: bool,
    stdin: Option<Vec<u8>>,
}

impl ExecRequest {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            inherit_env: false,
            ..Self::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn inherit_env(mut self, inherit: bool) -> Self {
        self.inherit_env = inherit;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn capture_output(mut self, capture: bool) -> Self {
        self.capture_output = capture;
        self
    }

    /// Bytes written to the child's stdin before waiting on it.
    pub fn stdin(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(data.into());
        self
    }
}

#[derive(Debug)]
pub struct ExecOutput {
    pub status: std::process::ExitStatus,
    pub stdout: String,
    pub stderr: String,
}
