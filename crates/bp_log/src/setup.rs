//! Logging setup for binaries that embed blockprof.

/// Set `RUST_LOG` to `info` unless already set.
#[cfg(not(target_arch = "wasm32"))]
fn set_default_rust_log_env() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
}

/// Install a `tracing` subscriber that logs to stdout, honoring `RUST_LOG`.
///
/// Call this at most once, early in `main`.
#[cfg(not(target_arch = "wasm32"))]
pub fn setup_native_logging() {
    set_default_rust_log_env();
    tracing_subscriber::fmt::init();
}
