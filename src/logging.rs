//! Tracing subscriber setup.

use crate::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Installs the global fmt subscriber.
///
/// `RUST_LOG` wins over `config.level`; `debug` forces the `debug` level for
/// this crate. Calling this more than once is harmless.
pub fn init(config: &LoggingConfig, debug: bool) {
    let filter = build_filter(config, debug);

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(config.ansi)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

fn build_filter(config: &LoggingConfig, debug: bool) -> EnvFilter {
    if debug {
        return EnvFilter::new("pangolin=debug,tower_http=debug,info");
    }
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
