//! Logging setup

use simple_logger::SimpleLogger;
use tracing::log::LevelFilter;

/// HTTP client internals that drown out the per-expression lines unless debugging.
const QUIET_MODULES: &[(&str, LevelFilter)] = &[
    ("tracing", LevelFilter::Warn),
    ("ureq", LevelFilter::Warn),
    ("ureq_proto", LevelFilter::Warn),
    ("rustls", LevelFilter::Info),
];

/// Logger for a run: `Debug` with everything when debugging, otherwise `Info`
/// with the HTTP stack turned down.
pub fn build_logger(debug: bool) -> SimpleLogger {
    if debug {
        return SimpleLogger::new().with_level(LevelFilter::Debug);
    }
    QUIET_MODULES.iter().fold(
        SimpleLogger::new().with_level(LevelFilter::Info),
        |logger, (module, level)| logger.with_module_level(module, *level),
    )
}

/// Installs the logger; fails if one is already installed.
pub fn setup_logging(debug: bool) -> Result<(), Box<std::io::Error>> {
    build_logger(debug).init().map_err(|err| {
        eprintln!("Failed to initialize logger: {}", err);
        Box::new(std::io::Error::other(err))
    })
}
