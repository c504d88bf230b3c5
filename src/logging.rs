//! Logging setup for the binary.

use env_logger::{Builder, Env};
use log::LevelFilter;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Initialize `env_logger` from `RUST_LOG`, defaulting to `info`.
///
/// Each `verbose` step raises the level above the environment's choice;
/// `quiet` limits output to errors. Safe to call more than once.
pub fn init(verbose: u8, quiet: bool) {
    let mut builder = Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER));
    if let Some(level) = level_override(verbose, quiet) {
        builder.filter_level(level);
    }
    builder.format_timestamp_secs();
    // Tests and repeated calls may have installed a logger already
    let _ = builder.try_init();
}

fn level_override(verbose: u8, quiet: bool) -> Option<LevelFilter> {
    if quiet {
        return Some(LevelFilter::Error);
    }
    match verbose {
        0 => None,
        1 => Some(LevelFilter::Debug),
        _ => Some(LevelFilter::Trace),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_override() {
        assert_eq!(level_override(0, false), None);
        assert_eq!(level_override(1, false), Some(LevelFilter::Debug));
        assert_eq!(level_override(3, false), Some(LevelFilter::Trace));
        assert_eq!(level_override(2, true), Some(LevelFilter::Error));
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init(0, false);
        init(1, false);
    }
}
