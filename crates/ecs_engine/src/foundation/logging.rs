//! Logging utilities

pub use log::{debug, info, warn, error, trace};

use crate::core::config::EngineConfig;

/// Initialize the logging system from the engine configuration
///
/// `RUST_LOG` takes precedence over `EngineConfig::log_level` when set.
/// Calling this more than once is harmless; later calls are ignored.
pub fn init(config: &EngineConfig) {
    let env = env_logger::Env::default().default_filter_or(config.log_level.as_str());
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::debug!("Logger already initialized, keeping existing configuration");
    }
}

/// Initialize logging for tests, capturing output per test
#[cfg(test)]
pub(crate) fn init_test() {
    let _ = env_logger::builder().is_test(true).try_init();
}
