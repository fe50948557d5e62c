use std::ffi::OsString;

use clap::{CommandFactory, Parser};

#[derive(Parser, Debug)]
#[command(
    name = "minian-docker",
    version,
    about = "Run MiniAn inside Docker (bash shell, notebook server or GUI) with the current directory mounted at /app.",
    override_usage = "minian-docker [OPTIONS] <CONTAINER> [EXTRA]...",
    after_long_help = "Examples:\n  minian-docker notebook\n  minian-docker --port 8888 notebook\n  minian-docker --dry-run gui\n\nEnvironment:\n  MINIAN_NOTEBOOK_PORT, MINIAN_DOCKER_OWNER, MINIAN_DOCKER_TIMEOUT,\n  MINIAN_DOCKER_PROBE_TIMEOUT, MINIAN_DOCKER_INTERFACE, MINIAN_DOCKER_ENGINE,\n  MINIAN_DOCKER_LOG, MINIAN_DOCKER_COLOR, DISPLAY, XAUTHORITY\n"
)]
pub(crate) struct Cli {
    /// The container to launch: bash, notebook or gui
    #[arg(value_name = "CONTAINER")]
    pub(crate) container: String,

    /// Unrecognized extra arguments (accepted and ignored)
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, hide = true)]
    pub(crate) extra: Vec<String>,

    /// Host port for the notebook server (overrides MINIAN_NOTEBOOK_PORT)
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub(crate) port: Option<u16>,

    /// Registry namespace of the published images (overrides MINIAN_DOCKER_OWNER)
    #[arg(long)]
    pub(crate) owner: Option<String>,

    /// Time limit for pull and build, e.g. 10m (overrides MINIAN_DOCKER_TIMEOUT)
    #[arg(long)]
    pub(crate) timeout: Option<String>,

    /// Do not pull the published image before building
    #[arg(long = "no-update")]
    pub(crate) no_update: bool,

    /// Print detailed execution info
    #[arg(long)]
    pub(crate) verbose: bool,

    /// Suppress the message of the day
    #[arg(long, short = 'q')]
    pub(crate) quiet: bool,

    /// Prepare and print what would run, but do not execute
    #[arg(long)]
    pub(crate) dry_run: bool,

    /// Colorize output: auto|always|never
    #[arg(long = "color", value_enum)]
    pub(crate) color: Option<minian_docker::ColorMode>,
}

/// Split `argv` into what clap should parse and unknown flags to ignore.
///
/// Unrecognized options are dropped wherever they appear; everything after `--` is kept.
pub(crate) fn split_unknown_flags<I>(argv: I) -> (Vec<OsString>, Vec<String>)
where
    I: IntoIterator<Item = OsString>,
{
    let mut cmd = Cli::command();
    cmd.build();
    // (takes a value, matched by long name or short char)
    let known = |word: &str| -> Option<bool> {
        cmd.get_arguments().find_map(|a| {
            let hit = match word.strip_prefix("--") {
                Some(long) => a.get_long() == Some(long),
                None => word.chars().nth(1).is_some_and(|c| a.get_short() == Some(c)),
            };
            hit.then(|| a.get_action().takes_values())
        })
    };

    let mut kept = Vec::new();
    let mut ignored = Vec::new();
    let mut iter = argv.into_iter();
    kept.extend(iter.next());
    while let Some(arg) = iter.next() {
        let word = arg.to_string_lossy().into_owned();
        if word == "--" {
            kept.push(arg);
            kept.extend(iter.by_ref());
            break;
        }
        if !word.starts_with('-') || word == "-" {
            kept.push(arg);
            continue;
        }
        let name = word.split('=').next().unwrap_or(&word);
        match known(name) {
            Some(takes_value) => {
                let inline = word.contains('=') || (!word.starts_with("--") && word.len() > 2);
                kept.push(arg);
                if takes_value && !inline {
                    kept.extend(iter.next());
                }
            }
            None => ignored.push(word),
        }
    }
    (kept, ignored)
}
