//! Log output for the ravcat binary
//!
//! The library only emits `tracing` events; this module installs the
//! subscriber that prints them to stderr.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum VerbosityLevel {
    Quiet = 0,    // Warnings and errors only (fallback use, skipped entries)
    Summary = 1,  // Load progress, cache hits
    Debug = 2,    // Every attempt, retry delay and normalization step
}

impl VerbosityLevel {
    pub fn from_verbose_count(count: u8) -> Self {
        match count {
            0 => VerbosityLevel::Quiet,
            1 => VerbosityLevel::Summary,
            2.. => VerbosityLevel::Debug,
        }
    }

    pub fn level_filter(self) -> LevelFilter {
        match self {
            VerbosityLevel::Quiet => LevelFilter::WARN,
            VerbosityLevel::Summary => LevelFilter::INFO,
            VerbosityLevel::Debug => LevelFilter::DEBUG,
        }
    }
}

/// Install the global subscriber. `RUST_LOG`, when set, takes precedence.
///
/// Calling this twice is harmless; the second call is ignored.
pub fn init(verbosity: VerbosityLevel) {
    let filter = EnvFilter::builder()
        .with_default_directive(verbosity.level_filter().into())
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
