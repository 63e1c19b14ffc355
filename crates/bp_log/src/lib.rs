//! Text logging for the blockprof crates.
//!
//! This is a thin wrapper around the `tracing` macros, plus `*_once` variants
//! for messages that would otherwise repeat on every profiled call.
//!
//! Not to be confused with the block records blockprof itself emits.

mod log_once;
mod setup;

pub use tracing::{debug, error, info, trace, warn};

pub use crate::log_once::log_once_if_new;

#[cfg(not(target_arch = "wasm32"))]
pub use crate::setup::setup_native_logging;

/// Re-exports of the crates we build on, so that callers don't need to
/// depend on them directly.
pub mod external {
    pub use tracing;
}

/// Log a warning the first time it is hit, then never again.
///
/// Useful on hot instrumentation paths where a misconfiguration would
/// otherwise log once per frame.
#[macro_export]
macro_rules! warn_once {
    ($($arg:tt)*) => {{
        let msg = format!($($arg)*);
        if $crate::log_once_if_new(&msg) {
            $crate::warn!("{msg}");
        }
    }};
}

/// Log a message the first time it is hit, then never again.
#[macro_export]
macro_rules! info_once {
    ($($arg:tt)*) => {{
        let msg = format!($($arg)*);
        if $crate::log_once_if_new(&msg) {
            $crate::info!("{msg}");
        }
    }};
}
