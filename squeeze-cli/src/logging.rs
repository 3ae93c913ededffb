// ============================================================================
// squeeze-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: env_logger initialization for the squeeze binary
//
// The level defaults to Info (Debug with --verbose); RUST_LOG, when set,
// takes precedence so individual modules can be turned up:
// - RUST_LOG=squeeze_core::validation=debug: flattened facts and comparisons
// - RUST_LOG=squeeze_core::external=debug: every ffmpeg/ffprobe command line

use std::io::Write;

use console::style;
use env_logger::{Builder, Env};
use log::{Level, LevelFilter};

/// Level used when RUST_LOG is not set.
pub fn default_level(verbose: bool) -> LevelFilter {
    if verbose { LevelFilter::Debug } else { LevelFilter::Info }
}

/// Initializes the global logger. Output goes to stderr so `--json` output
/// on stdout stays machine readable.
pub fn init(verbose: bool) {
    let level = default_level(verbose);
    Builder::from_env(Env::default().default_filter_or(level.as_str()))
        .format(|buf, record| {
            let level = match record.level() {
                Level::Error => style("ERROR").red().bold(),
                Level::Warn => style("WARN ").yellow(),
                Level::Info => style("INFO ").green(),
                Level::Debug => style("DEBUG").blue(),
                Level::Trace => style("TRACE").magenta(),
            };
            writeln!(buf, "{} {} {}", buf.timestamp_seconds(), level, record.args())
        })
        .init();

    log::debug!("Logger initialized with default level {}", level);
}
