//! Tracing subscriber setup for the CLI

use std::io::IsTerminal;
use std::str::FromStr;

use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt;

use crate::cli::LogArgs;

/// Install the global subscriber writing to stderr.
pub fn init_global_subscriber(args: LogArgs) {
    let level = log_level(args, std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref());
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .without_time()
        .with_target(false)
        .compact()
        .try_init();
}

fn log_level(args: LogArgs, rust_log: Option<&str>) -> LevelFilter {
    match args.quiet {
        0 => (),
        1 => return LevelFilter::WARN,
        _ => return LevelFilter::ERROR,
    }

    if let Some(level) = rust_log.and_then(|v| LevelFilter::from_str(v).ok()) {
        return level;
    }

    match args.verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(verbose: u8, quiet: u8) -> LogArgs {
        LogArgs { verbose, quiet }
    }

    #[test]
    fn test_default_level_is_info() {
        assert_eq!(log_level(args(0, 0), None), LevelFilter::INFO);
    }

    #[test]
    fn test_verbosity_raises_level() {
        assert_eq!(log_level(args(1, 0), None), LevelFilter::DEBUG);
        assert_eq!(log_level(args(3, 0), None), LevelFilter::TRACE);
    }

    #[test]
    fn test_quiet_wins() {
        assert_eq!(log_level(args(0, 1), Some("trace")), LevelFilter::WARN);
        assert_eq!(log_level(args(0, 2), None), LevelFilter::ERROR);
    }

    #[test]
    fn test_rust_log_plain_level_overrides_verbosity() {
        assert_eq!(log_level(args(2, 0), Some("warn")), LevelFilter::WARN);
        assert_eq!(log_level(args(1, 0), Some("pblog=trace")), LevelFilter::DEBUG);
    }
}
