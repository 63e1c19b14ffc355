//! The blockprof SDK: named, nestable, filterable timed blocks.
//!
//! A [`ProfilerSession`] interns block descriptors, keeps a per-thread stack
//! of open blocks, resolves each block's recording status against its
//! ancestors, and hands completed [`BlockRecord`]s to a pluggable
//! [`sink::BlockSink`].
//!
//! ```
//! let session = bp_sdk::ProfilerSessionBuilder::new("my_app").buffered();
//!
//! session.run_block(
//!     "load_assets",
//!     || { /* traced work */ },
//!     bp_sdk::Color::DEFAULT,
//!     bp_sdk::StatusFlags::ON,
//!     file!(),
//!     line!(),
//! );
//! ```

#![warn(missing_docs)] // Let's keep this crate well-documented!

// ----------------
// Private modules:

mod block_sink;
mod block_stack;
mod global;
mod macros;
mod session;

// -------------
// Public items:

pub use self::block_stack::UnbalancedBlockError;
pub use self::session::{BlockScope, ProfilerSession, ProfilerSessionBuilder};

pub use self::global::{global_session, global_session_with_default_enabled};

pub use bp_types::{
    BlockDescriptor, BlockRecord, Color, Duration, ResolvedStatus, StatusFlags, Time,
};

// ---------------
// Public modules:

/// Different destinations for completed block records.
///
/// This is how you select whether records end up buffered in RAM, in shared
/// memory storage, or in a custom exporter.
pub mod sink {
    pub use crate::block_sink::{
        disabled, BlockSink, BufferedSink, MemorySink, MemorySinkStorage,
    };
}

/// Re-exports of other crates.
pub mod external {
    pub use bp_log;
    pub use bp_registry;
    pub use bp_types;
}

// -----
// Misc:

const BLOCKPROF_ENV_VAR: &str = "BLOCKPROF";

/// Parse an on/off value the way the `BLOCKPROF` environment variable is
/// parsed.
fn parse_enabled_value(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "0" | "false" | "off" => Some(false),
        "1" | "true" | "on" => Some(true),
        _ => None,
    }
}

/// Helper to get the value of the `BLOCKPROF` environment variable.
fn get_blockprof_env() -> Option<bool> {
    std::env::var(BLOCKPROF_ENV_VAR).ok().and_then(|s| {
        let parsed = parse_enabled_value(&s);
        if parsed.is_none() {
            bp_log::warn_once!(
                "Invalid value for environment variable {BLOCKPROF_ENV_VAR}={s:?}. Expected 'on' or 'off'. It will be ignored"
            );
        }
        parsed
    })
}

/// Checks the `BLOCKPROF` environment variable. If not found, returns the
/// argument.
///
/// Also adds some helpful logging.
pub fn decide_profiling_enabled(default_enabled: bool) -> bool {
    // We use `info_once` so that this can be called many times without
    // spamming the log.
    match get_blockprof_env() {
        Some(true) => {
            bp_log::info_once!(
                "Profiling is enabled by the '{BLOCKPROF_ENV_VAR}' environment variable."
            );
            true
        }
        Some(false) => {
            bp_log::info_once!(
                "Profiling is disabled by the '{BLOCKPROF_ENV_VAR}' environment variable."
            );
            false
        }
        None => {
            if !default_enabled {
                bp_log::info_once!(
                    "Profiling has been disabled. Turn it on with the '{BLOCKPROF_ENV_VAR}' environment variable."
                );
            }
            default_enabled
        }
    }
}

#[cfg(test)]
mod tests {
    use super::parse_enabled_value;

    #[test]
    fn enabled_value_parsing() {
        for on in ["1", "true", "on", "ON", "True"] {
            assert_eq!(parse_enabled_value(on), Some(true), "{on:?}");
        }
        for off in ["0", "false", "off", "OFF"] {
            assert_eq!(parse_enabled_value(off), Some(false), "{off:?}");
        }
        for junk in ["", "yes", "2", "enabled"] {
            assert_eq!(parse_enabled_value(junk), None, "{junk:?}");
        }
    }
}
