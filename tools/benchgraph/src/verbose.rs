//! Logging setup and verbosity levels.
//!
//! Three output levels controlled by CLI flags:
//! - **Quiet** (`-q`): warnings and errors only
//! - **Default** (no flag): per-file load counts and the written document
//! - **Verbose** (`-v`): per-page details and phase timings
//!
//! `RUST_LOG` takes precedence over the flags when set.

use std::time::Instant;

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Output verbosity level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Quiet = 0,
    Default = 1,
    Verbose = 2,
}

impl Verbosity {
    /// Select a level from the `-q`/`-v` flags.
    pub fn from_flags(quiet: bool, verbose: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Default
        }
    }

    /// Maximum `tracing` level emitted at this verbosity.
    pub fn level(self) -> Level {
        match self {
            Verbosity::Quiet => Level::WARN,
            Verbosity::Default => Level::INFO,
            Verbosity::Verbose => Level::DEBUG,
        }
    }
}

/// Install the global log subscriber for the current process.
pub fn init(quiet: bool, verbose: bool) {
    let level = Verbosity::from_flags(quiet, verbose).level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_ascii_lowercase()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stdout)
        .try_init();
}

/// RAII timer that logs elapsed duration at debug level on drop.
///
/// ```ignore
/// let _t = Timer::start("rendering");
/// // ... work ...
/// // logs "rendering: 42.0ms" on drop
/// ```
pub struct Timer {
    label: &'static str,
    start: Instant,
}

impl Timer {
    /// Begin timing a labeled operation.
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            start: Instant::now(),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        tracing::debug!("{}: {:.1?}", self.label, self.start.elapsed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_map_to_levels() {
        assert_eq!(Verbosity::from_flags(true, false).level(), Level::WARN);
        assert_eq!(Verbosity::from_flags(false, false).level(), Level::INFO);
        assert_eq!(Verbosity::from_flags(false, true).level(), Level::DEBUG);
    }

    #[test]
    fn quiet_wins() {
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Quiet);
    }
}
