use crate::session::ProfilerSession;

/// Access a global [`ProfilerSession`] singleton for convenient tracing.
///
/// By default, profiling is enabled. To disable it, call `set_enabled(false)`
/// on the global session, or set the `BLOCKPROF` environment variable to
/// `false`.
///
/// The tracing core itself never consults this: it exists purely as a
/// convenience for applications that don't want to thread a session handle
/// through every call site.
pub fn global_session() -> parking_lot::MutexGuard<'static, ProfilerSession> {
    let default_enabled = true;
    global_session_with_default_enabled(default_enabled)
}

/// Access a global [`ProfilerSession`] singleton for convenient tracing.
///
/// The given variable controls if profiling is enabled by default.
/// It can be overridden with the `BLOCKPROF` environment variable.
pub fn global_session_with_default_enabled(
    default_enabled: bool,
) -> parking_lot::MutexGuard<'static, ProfilerSession> {
    use once_cell::sync::OnceCell;
    use parking_lot::Mutex;
    static INSTANCE: OnceCell<Mutex<ProfilerSession>> = OnceCell::new();

    let mutex = INSTANCE
        .get_or_init(|| Mutex::new(ProfilerSession::with_default_enabled(default_enabled)));
    mutex.lock()
}
