use std::process::ExitCode;

use clap::Parser;

use minian_docker::{
    color_enabled_stderr, config, container_runtime_path, exit_code_for_launch_error, logging,
    platform, set_color_mode, Collaborators, ContainerEngine, ContainerKind, DisplayEnv, DockerCli,
    IdCommandProbe, IfconfigProbe, LaunchConfig, LaunchError, Launcher, LogSink, PreviewEngine,
    TracingSink,
};

mod cli;

use cli::Cli;

fn resolve_config(cli: &Cli) -> Result<LaunchConfig, LaunchError> {
    let mut cfg = LaunchConfig::from_env()?;
    if let Some(port) = cli.port {
        cfg.notebook_port = port;
    }
    if let Some(owner) = cli.owner.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        cfg.owner = owner.to_string();
    }
    if let Some(t) = cli.timeout.as_deref() {
        cfg.engine_timeout = config::parse_timeout(t)?;
    }
    if cli.no_update {
        cfg.update = false;
    }
    if cli.quiet {
        cfg.show_motd = false;
    }
    Ok(cfg)
}

fn logged(log: &dyn LogSink, e: LaunchError) -> LaunchError {
    log.error(&e.to_string());
    e
}

/// Every error returned here has already been logged once: setup failures below, stage
/// failures by the launcher itself.
fn launch(cli: &Cli, log: &dyn LogSink) -> Result<(), LaunchError> {
    // Reject unsupported kinds before looking for the container engine.
    cli.container
        .parse::<ContainerKind>()
        .map_err(|e| logged(log, e))?;
    let cfg = resolve_config(cli).map_err(|e| logged(log, e))?;
    let platform = platform::current().map_err(|e| logged(log, e))?;
    let display = DisplayEnv::from_env();
    let identity = IdCommandProbe::new(cfg.probe_timeout);
    let interfaces = IfconfigProbe::new(cfg.interface.clone(), cfg.probe_timeout);

    let preview;
    let docker;
    let engine: &dyn ContainerEngine = if cli.dry_run {
        preview = PreviewEngine::new();
        &preview
    } else {
        let runtime = container_runtime_path().map_err(|e| logged(log, e.into()))?;
        docker = DockerCli::new(runtime, cfg.engine_timeout);
        &docker
    };

    let deps = Collaborators {
        engine,
        identity: &identity,
        interfaces: &interfaces,
        log,
    };
    let mut launcher = Launcher::new(&cli.container, platform, cfg, display, deps)
        .map_err(|e| logged(log, e))?;
    log.debug(&format!(
        "container: {} (remote {}, local {}) on {platform}",
        launcher.kind(),
        launcher.images().remote,
        launcher.images().local
    ));
    launcher.launch()?;
    if cli.dry_run {
        log.info("dry-run requested; not executing Docker.");
    }
    Ok(())
}

fn main() -> ExitCode {
    let (argv, unknown) = cli::split_unknown_flags(std::env::args_os());
    let cli = Cli::parse_from(argv);
    if let Some(mode) = cli.color {
        set_color_mode(mode);
    }
    logging::init(cli.verbose, color_enabled_stderr());
    let log = TracingSink;

    let ignored: Vec<&str> = unknown
        .iter()
        .chain(cli.extra.iter())
        .map(String::as_str)
        .collect();
    if !ignored.is_empty() {
        log.warn(&format!("ignoring extra arguments: {}", ignored.join(" ")));
    }

    match launch(&cli, &log) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => ExitCode::from(exit_code_for_launch_error(&e)),
    }
}
