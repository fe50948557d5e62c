mod common;

use common::{Call, FixedIdentity, FixedInterface, RecordingEngine};
use minian_docker::{DisplayEnv, LaunchError, LaunchState, Launcher, MemorySink, Platform};
use tracing::Level;

#[test]
fn test_bash_on_linux_end_to_end() {
    let engine = RecordingEngine::ok();
    let identity = FixedIdentity::alice();
    let iface = FixedInterface(None);
    let log = MemorySink::new();
    let mut launcher = Launcher::new(
        "bash",
        Platform::Linux,
        common::test_config(),
        common::linux_display(),
        common::deps(&engine, &identity, &iface, &log),
    )
    .unwrap();
    assert_eq!(launcher.state(), LaunchState::Idle);

    launcher.launch().expect("launch succeeds");
    assert_eq!(launcher.state(), LaunchState::Done);

    let calls = engine.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(
        calls[0],
        Call::Pull("velonica2227/minian-docker-base".into())
    );
    match &calls[1] {
        Call::Build { tag, recipe } => {
            assert_eq!(tag, "minian-docker-base");
            assert!(recipe.starts_with("FROM velonica2227/minian-docker-base\n"));
            assert!(recipe.contains("groupadd -g 1001 staff || groupmod -og 1001 staff"));
            assert!(recipe.contains("useradd -d /home -s /bin/bash -u 1000 -g 1001 alice"));
        }
        other => panic!("expected build, got {other:?}"),
    }
    let args = engine.run_args().expect("run issued");
    assert_eq!(&args[args.len() - 2..], ["minian-docker-base", "bash"]);
    assert!(log.contains(Level::INFO, "Build succeeded."));
    assert!(log.contains(
        Level::INFO,
        "Configuring a local container for user alice (1000) in group staff (1001)"
    ));
}

#[test]
fn test_windows_never_builds() {
    for kind in ["bash", "notebook", "gui"] {
        let engine = RecordingEngine::ok();
        let identity = FixedIdentity(Err("id is not available".into()));
        let iface = FixedInterface(None);
        let log = MemorySink::new();
        let mut launcher = Launcher::new(
            kind,
            Platform::Windows,
            common::test_config(),
            DisplayEnv::default(),
            common::deps(&engine, &identity, &iface, &log),
        )
        .unwrap();
        launcher.launch().expect("windows launch succeeds");
        assert_eq!(engine.builds(), 0, "kind {kind} built on windows");
        let args = engine.run_args().unwrap();
        assert!(args.iter().any(|a| a.starts_with("velonica2227/")));
    }
}

#[test]
fn test_pull_failure_aborts_before_build() {
    let mut engine = RecordingEngine::ok();
    engine.pull_code = Some(1);
    let identity = FixedIdentity::alice();
    let iface = FixedInterface(None);
    let log = MemorySink::new();
    let mut launcher = Launcher::new(
        "notebook",
        Platform::Linux,
        common::test_config(),
        common::linux_display(),
        common::deps(&engine, &identity, &iface, &log),
    )
    .unwrap();

    let err = launcher.launch().unwrap_err();
    assert!(matches!(err, LaunchError::PullFailed { code: Some(1), .. }));
    assert_eq!(launcher.state(), LaunchState::Aborted);
    assert_eq!(engine.calls().len(), 1);
    assert!(log.contains(
        Level::ERROR,
        "failed updating docker image for velonica2227/minian-docker-notebook"
    ));
}

#[test]
fn test_build_failure_aborts_before_run() {
    let mut engine = RecordingEngine::ok();
    engine.build_code = Some(2);
    let identity = FixedIdentity::alice();
    let iface = FixedInterface(None);
    let log = MemorySink::new();
    let mut launcher = Launcher::new(
        "gui",
        Platform::Linux,
        common::test_config(),
        common::linux_display(),
        common::deps(&engine, &identity, &iface, &log),
    )
    .unwrap();

    let err = launcher.launch().unwrap_err();
    assert!(matches!(err, LaunchError::BuildFailed { ref tag, .. } if tag == "minian-docker-gui"));
    assert_eq!(launcher.state(), LaunchState::Aborted);
    assert!(engine.run_args().is_none());
}

#[test]
fn test_run_failure_is_reported() {
    let mut engine = RecordingEngine::ok();
    engine.run_code = Some(125);
    let identity = FixedIdentity::alice();
    let iface = FixedInterface(None);
    let log = MemorySink::new();
    let mut launcher = Launcher::new(
        "bash",
        Platform::Linux,
        common::test_config(),
        common::linux_display(),
        common::deps(&engine, &identity, &iface, &log),
    )
    .unwrap();

    let err = launcher.launch().unwrap_err();
    assert!(matches!(err, LaunchError::RunFailed { code: Some(125), .. }));
    assert_eq!(launcher.state(), LaunchState::Aborted);
}

#[test]
fn test_identity_failure_stops_build() {
    let engine = RecordingEngine::ok();
    let identity = FixedIdentity(Err("empty uid".into()));
    let iface = FixedInterface(None);
    let log = MemorySink::new();
    let mut launcher = Launcher::new(
        "bash",
        Platform::Macos,
        common::test_config(),
        DisplayEnv::default(),
        common::deps(&engine, &identity, &iface, &log),
    )
    .unwrap();

    let err = launcher.launch().unwrap_err();
    assert!(matches!(err, LaunchError::IdentityProbeFailed(_)));
    assert_eq!(engine.builds(), 0);
    assert_eq!(launcher.state(), LaunchState::Aborted);
}

#[test]
fn test_stages_out_of_order_are_rejected() {
    let engine = RecordingEngine::ok();
    let identity = FixedIdentity::alice();
    let iface = FixedInterface(None);
    let log = MemorySink::new();
    let mut launcher = Launcher::new(
        "bash",
        Platform::Linux,
        common::test_config(),
        common::linux_display(),
        common::deps(&engine, &identity, &iface, &log),
    )
    .unwrap();

    let err = launcher.build().unwrap_err();
    assert!(matches!(
        err,
        LaunchError::OutOfOrder {
            from: LaunchState::Idle,
            to: LaunchState::Building
        }
    ));
    assert_eq!(launcher.state(), LaunchState::Aborted);
    assert!(engine.calls().is_empty());
    assert!(launcher.update().is_err(), "aborted launches stay aborted");
}

#[test]
fn test_no_update_skips_pull() {
    let engine = RecordingEngine::ok();
    let identity = FixedIdentity::alice();
    let iface = FixedInterface(None);
    let log = MemorySink::new();
    let mut cfg = common::test_config();
    cfg.update = false;
    let mut launcher = Launcher::new(
        "bash",
        Platform::Linux,
        cfg,
        common::linux_display(),
        common::deps(&engine, &identity, &iface, &log),
    )
    .unwrap();

    launcher.launch().unwrap();
    assert!(!engine.calls().iter().any(|c| matches!(c, Call::Pull(_))));
    assert!(log.contains(Level::INFO, "Skipping update"));
}

#[test]
fn test_unsupported_kind_fails_at_construction() {
    let engine = RecordingEngine::ok();
    let identity = FixedIdentity::alice();
    let iface = FixedInterface(None);
    let log = MemorySink::new();
    let result = Launcher::new(
        "fortran",
        Platform::Linux,
        common::test_config(),
        common::linux_display(),
        common::deps(&engine, &identity, &iface, &log),
    );
    assert!(matches!(
        result,
        Err(LaunchError::UnsupportedContainerKind(ref k)) if k == "fortran"
    ));
    assert!(engine.calls().is_empty());
}

#[test]
fn test_engine_spawn_failure_names_the_stage() {
    let mut engine = RecordingEngine::ok();
    engine.spawn_failure = true;
    let identity = FixedIdentity::alice();
    let iface = FixedInterface(None);
    let log = MemorySink::new();
    let mut launcher = Launcher::new(
        "bash",
        Platform::Linux,
        common::test_config(),
        common::linux_display(),
        common::deps(&engine, &identity, &iface, &log),
    )
    .unwrap();
    let err = launcher.launch().unwrap_err();
    assert_eq!(err.to_string(), "update stage: failed to spawn \"docker\"");
    assert!(log.contains(Level::ERROR, "update stage: failed to spawn"));

    let mut cfg = common::test_config();
    cfg.update = false;
    let log = MemorySink::new();
    let mut launcher = Launcher::new(
        "notebook",
        Platform::Linux,
        cfg,
        common::linux_display(),
        common::deps(&engine, &identity, &iface, &log),
    )
    .unwrap();
    let err = launcher.launch().unwrap_err();
    assert!(err.to_string().starts_with("build stage: "), "{err}");
    assert_eq!(launcher.state(), LaunchState::Aborted);
}

#[test]
fn test_build_recipe_is_logged_through_the_sink() {
    let engine = RecordingEngine::ok();
    let identity = FixedIdentity::alice();
    let iface = FixedInterface(None);
    let log = MemorySink::new();
    let mut launcher = Launcher::new(
        "bash",
        Platform::Linux,
        common::test_config(),
        common::linux_display(),
        common::deps(&engine, &identity, &iface, &log),
    )
    .unwrap();
    launcher.launch().unwrap();
    assert!(log.contains(Level::DEBUG, "FROM velonica2227/minian-docker-base"));
    assert!(log.contains(Level::DEBUG, "USER alice"));
}
