//! Message of the day shown right before the container starts.

pub const MOTD: &str = "\
──────────────────────────────────────────────────────────────────────
  MiniAn in Docker
──────────────────────────────────────────────────────────────────────
  Your current directory is mounted at /app (also the working directory).
  Files you create there belong to your host user, not to root.

  notebook : open http://127.0.0.1:<port> in your browser (default 8000)
  gui      : windows render on your host X server (XQuartz on macOS)
  bash     : leave the container with `exit`; it is removed on exit
──────────────────────────────────────────────────────────────────────";

pub fn print_motd() {
    println!("{MOTD}");
    println!();
}
