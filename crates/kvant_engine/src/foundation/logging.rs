//! Logging utilities
//!
//! The engine logs through the `log` facade. Binaries pick the sink; the
//! default one is `env_logger`, configured through `RUST_LOG`.

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system with `env_logger`
///
/// Falls back to `info` when `RUST_LOG` is unset. Calling this twice is
/// harmless; the second installation attempt is ignored.
pub fn init() {
    let env = env_logger::Env::default().default_filter_or("info");
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}
