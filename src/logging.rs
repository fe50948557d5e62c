//! Leveled, timestamped logging.
//!
//! The launcher never logs through globals: it is handed a [`LogSink`]. The binary passes
//! [`TracingSink`], which forwards to the `tracing` subscriber installed by [`init`].

use std::cell::RefCell;
use std::env;
use std::fmt;
use std::time::SystemTime;

use tracing::Level;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::EnvFilter;

pub trait LogSink {
    fn log(&self, level: Level, message: &str);

    fn debug(&self, message: &str) {
        self.log(Level::DEBUG, message);
    }

    fn info(&self, message: &str) {
        self.log(Level::INFO, message);
    }

    fn warn(&self, message: &str) {
        self.log(Level::WARN, message);
    }

    fn error(&self, message: &str) {
        self.log(Level::ERROR, message);
    }
}

/// Forwards to `tracing` events under the `minian_docker` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, level: Level, message: &str) {
        match level {
            Level::ERROR => tracing::error!(target: "minian_docker", "{message}"),
            Level::WARN => tracing::warn!(target: "minian_docker", "{message}"),
            Level::INFO => tracing::info!(target: "minian_docker", "{message}"),
            Level::DEBUG => tracing::debug!(target: "minian_docker", "{message}"),
            _ => tracing::trace!(target: "minian_docker", "{message}"),
        }
    }
}

/// Records messages in memory; for embedding and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: RefCell<Vec<(Level, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries.borrow().clone()
    }

    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.entries
            .borrow()
            .iter()
            .any(|(l, m)| *l == level && m.contains(needle))
    }
}

impl LogSink for MemorySink {
    fn log(&self, level: Level, message: &str) {
        self.entries.borrow_mut().push((level, message.to_string()));
    }
}

/// RFC 3339 timestamps at second precision.
struct SecondsTimer;

impl FormatTime for SecondsTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", humantime::format_rfc3339_seconds(SystemTime::now()))
    }
}

fn filter_directive(verbose: bool) -> String {
    env::var("MINIAN_DOCKER_LOG")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| if verbose { "debug" } else { "info" }.to_string())
}

/// Install the global stderr subscriber. A second call is a no-op.
pub fn init(verbose: bool, ansi: bool) {
    let filter = EnvFilter::try_new(filter_directive(verbose))
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_timer(SecondsTimer)
        .with_target(false)
        .with_ansi(ansi)
        .try_init();
    if result.is_err() {
        eprintln!("minian-docker: logging init skipped (global subscriber already set)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_records_levels() {
        let sink = MemorySink::new();
        sink.info("Build succeeded.");
        sink.error("Build failed");
        assert!(sink.contains(Level::INFO, "succeeded"));
        assert!(sink.contains(Level::ERROR, "failed"));
        assert!(!sink.contains(Level::WARN, "failed"));
        assert_eq!(sink.entries().len(), 2);
    }
}
