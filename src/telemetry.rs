use tracing::metadata::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Initialize the tracing stack: EnvFilter (overridable via `PRINTHALL_LOG`)
/// over a compact fmt layer on stderr. Stdout is reserved for event lines.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init(verbosity: u8, quiet: bool) {
    let level = if quiet {
        LevelFilter::ERROR
    } else {
        level_from_verbosity(verbosity)
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .with_env_var("PRINTHALL_LOG")
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .compact()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(true)
        .try_init();
}

fn level_from_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::ERROR,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_from_verbosity(0), LevelFilter::ERROR);
        assert_eq!(level_from_verbosity(1), LevelFilter::INFO);
        assert_eq!(level_from_verbosity(2), LevelFilter::DEBUG);
        assert_eq!(level_from_verbosity(9), LevelFilter::DEBUG);
    }
}
