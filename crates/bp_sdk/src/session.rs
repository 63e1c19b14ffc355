use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use web_time::Instant;

use bp_registry::BlockRegistry;
use bp_types::{BlockRecord, Color, StatusFlags, Time};

use crate::block_sink::{BlockSink, BufferedSink, MemorySink, MemorySinkStorage};
use crate::block_stack::{OpenBlock, ThreadStacks, UnbalancedBlockError};

// ----------------------------------------------------------------------------

/// Identifies one [`ProfilerSession`] in the per-thread block stacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct SessionId(u64);

impl SessionId {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl nohash_hasher::IsEnabled for SessionId {}

// ----------------------------------------------------------------------------

/// Construct a [`ProfilerSession`].
///
/// ``` no_run
/// # use bp_sdk::ProfilerSessionBuilder;
/// let session = ProfilerSessionBuilder::new("my_app").buffered();
/// ```
#[must_use]
#[derive(Debug)]
pub struct ProfilerSessionBuilder {
    application_id: String,
    default_enabled: bool,
    enabled: Option<bool>,
}

impl ProfilerSessionBuilder {
    /// Create a new builder with an application id.
    ///
    /// The application id is usually the name of your app.
    pub fn new(application_id: impl Into<String>) -> Self {
        Self {
            application_id: application_id.into(),
            default_enabled: true,
            enabled: None,
        }
    }

    /// Set whether or not profiling is enabled by default.
    ///
    /// If the `BLOCKPROF` environment variable is set, it will override this.
    ///
    /// See also: [`Self::enabled`].
    #[inline]
    pub fn default_enabled(mut self, default_enabled: bool) -> Self {
        self.default_enabled = default_enabled;
        self
    }

    /// Set whether or not profiling is enabled.
    ///
    /// Setting this will ignore the `BLOCKPROF` environment variable.
    ///
    /// See also: [`Self::default_enabled`].
    #[inline]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Buffer block records in RAM.
    ///
    /// Retrieve them later with [`ProfilerSession::drain_backlog`].
    pub fn buffered(self) -> ProfilerSession {
        let (enabled, application_id) = self.finalize();
        if enabled {
            ProfilerSession::new(application_id, Box::new(BufferedSink::new()))
        } else {
            bp_log::debug!("Profiling disabled - call to buffered() ignored");
            ProfilerSession::disabled()
        }
    }

    /// Record into shared in-memory storage that stays readable while the
    /// session keeps recording.
    pub fn memory(self) -> (ProfilerSession, MemorySinkStorage) {
        let (enabled, application_id) = self.finalize();
        let sink = MemorySink::default();
        let storage = sink.storage();
        if enabled {
            (ProfilerSession::new(application_id, Box::new(sink)), storage)
        } else {
            bp_log::debug!("Profiling disabled - call to memory() ignored");
            (ProfilerSession::disabled(), storage)
        }
    }

    /// Record to a custom [`BlockSink`].
    pub fn sink(self, sink: Box<dyn BlockSink>) -> ProfilerSession {
        let (enabled, application_id) = self.finalize();
        if enabled {
            ProfilerSession::new(application_id, sink)
        } else {
            bp_log::debug!("Profiling disabled - call to sink() ignored");
            ProfilerSession::disabled()
        }
    }

    /// Returns whether or not profiling is enabled, plus the application id.
    ///
    /// This can be used to then construct a [`ProfilerSession`] manually
    /// using [`ProfilerSession::new`].
    pub fn finalize(self) -> (bool, String) {
        let Self {
            application_id,
            default_enabled,
            enabled,
        } = self;

        let enabled = enabled.unwrap_or_else(|| crate::decide_profiling_enabled(default_enabled));
        (enabled, application_id)
    }
}

// ----------------------------------------------------------------------------

/// The main way to do blockprof tracing.
///
/// Construct one with [`ProfilerSessionBuilder`] and pass it (by reference or
/// cheap clone) to every place that wants to open blocks; there is no ambient
/// global lookup in the begin/end path.
///
/// Cloning a `ProfilerSession` is cheap (it's a shallow clone). The clone
/// interns into the same registry and records to the same sink.
#[must_use]
#[derive(Clone)]
pub struct ProfilerSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    id: SessionId,
    application_id: String,

    /// All [`Time`]s in this session are relative to this monotonic epoch.
    epoch: Instant,

    /// Runtime switch; checked first thing on every begin/end.
    enabled: AtomicBool,

    registry: BlockRegistry,
    sink: Arc<dyn BlockSink>,
}

impl ProfilerSession {
    /// Construct a new, enabled session recording to the given sink.
    ///
    /// See also: [`ProfilerSessionBuilder`].
    pub fn new(application_id: impl Into<String>, sink: Box<dyn BlockSink>) -> Self {
        let application_id = application_id.into();
        bp_log::debug!("Beginning profiler session for {application_id:?}");
        Self {
            inner: Arc::new(SessionInner {
                id: SessionId::next(),
                application_id,
                epoch: Instant::now(),
                enabled: AtomicBool::new(true),
                registry: BlockRegistry::new(),
                sink: sink.into(),
            }),
        }
    }

    /// Construct a session with a "dummy" sink that drops everything.
    ///
    /// [`Self::is_enabled`] will return `false`, and every begin/end is a
    /// guaranteed-cheap no-op.
    pub fn disabled() -> Self {
        Self {
            inner: Arc::new(SessionInner {
                id: SessionId::next(),
                application_id: String::new(),
                epoch: Instant::now(),
                enabled: AtomicBool::new(false),
                registry: BlockRegistry::new(),
                sink: crate::block_sink::disabled().into(),
            }),
        }
    }

    /// Enabled if `default_enabled`, unless overridden by the `BLOCKPROF`
    /// environment variable.
    pub fn with_default_enabled(default_enabled: bool) -> Self {
        if crate::decide_profiling_enabled(default_enabled) {
            Self::new("blockprof", Box::new(BufferedSink::new()))
        } else {
            Self::disabled()
        }
    }

    /// Check if this session records anything.
    ///
    /// If not, all begin/end calls degrade to no-ops.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::Relaxed)
    }

    /// Turn recording on or off at runtime.
    ///
    /// Takes effect for blocks begun after the call; blocks already open
    /// finish normally. Blocks begun while disabled still pair up with
    /// their own `end_block()`, they just never record.
    #[inline]
    pub fn set_enabled(&self, enabled: bool) {
        self.inner.enabled.store(enabled, Ordering::Relaxed);
    }

    /// The application id this session was built with.
    #[inline]
    pub fn application_id(&self) -> &str {
        &self.inner.application_id
    }

    /// Begin a named timed block on the current thread.
    ///
    /// Must be matched by a call to [`Self::end_block`] on the same thread.
    /// Prefer [`Self::scope`] (or the `profile_block!` macro), which cannot
    /// get unbalanced.
    pub fn begin_block(
        &self,
        name: &str,
        file: &str,
        line: u32,
        color: Color,
        flags: StatusFlags,
    ) {
        let inner = &*self.inner;
        if !self.is_enabled() {
            // Push a frame anyway, with no descriptor and no timestamp, so
            // that the matching end_block() pops *this* block and not an
            // enclosing one begun while the session was still enabled.
            let parent = ThreadStacks::parent_status(inner.id);
            ThreadStacks::push(inner.id, OpenBlock::skipped(parent));
            return;
        }

        let descriptor = inner.registry.intern(name, file, line, color, flags);
        let parent = ThreadStacks::parent_status(inner.id);
        ThreadStacks::push(
            inner.id,
            OpenBlock {
                descriptor: Some(descriptor),
                start: Time::since(inner.epoch),
                status: flags.resolve(parent),
                color,
                flags,
            },
        );
    }

    /// End the innermost open block on the current thread.
    ///
    /// If the block resolved to "recording" when it began, a [`BlockRecord`]
    /// is handed to the sink; otherwise the timing is discarded.
    ///
    /// Fails with [`UnbalancedBlockError`] if no block is open on this
    /// thread — a begin/end mismatch in the instrumentation. On a disabled
    /// session this is a no-op instead.
    pub fn end_block(&self) -> Result<(), UnbalancedBlockError> {
        let inner = &*self.inner;
        match ThreadStacks::pop(inner.id) {
            Ok(open) => {
                if open.status.record {
                    if let Some(descriptor) = open.descriptor {
                        inner.sink.accept(BlockRecord {
                            descriptor,
                            start: open.start,
                            duration: Time::since(inner.epoch) - open.start,
                            color: open.color,
                            flags: open.flags,
                        });
                    }
                }
                Ok(())
            }
            Err(err) if self.is_enabled() => Err(err),
            Err(_) => Ok(()), // disabled sessions degrade to no-ops
        }
    }

    /// Begin a block that ends when the returned [`BlockScope`] is dropped,
    /// on every exit path including panics.
    pub fn scope(
        &self,
        name: &str,
        file: &str,
        line: u32,
        color: Color,
        flags: StatusFlags,
    ) -> BlockScope<'_> {
        self.begin_block(name, file, line, color, flags);
        BlockScope { session: self }
    }

    /// Run `work` inside a block, returning its result.
    ///
    /// The block ends even if `work` panics; the panic then continues
    /// unwinding to the caller.
    pub fn run_block<R>(
        &self,
        name: &str,
        work: impl FnOnce() -> R,
        color: Color,
        flags: StatusFlags,
        file: &str,
        line: u32,
    ) -> R {
        let _scope = self.scope(name, file, line, color, flags);
        work()
    }

    /// Number of blocks currently open on this thread.
    #[inline]
    pub fn open_depth(&self) -> usize {
        ThreadStacks::depth(self.inner.id)
    }

    /// Number of distinct callsites interned so far.
    #[inline]
    pub fn num_callsites(&self) -> usize {
        self.inner.registry.len()
    }

    /// Drain all records buffered in the sink and return them.
    pub fn drain_backlog(&self) -> Vec<BlockRecord> {
        self.inner.sink.drain_backlog()
    }

    /// Block until the sink has fully delivered all pending records.
    pub fn flush_blocking(&self) {
        self.inner.sink.flush_blocking();
    }
}

impl AsRef<dyn BlockSink> for ProfilerSession {
    fn as_ref(&self) -> &dyn BlockSink {
        self.inner.sink.as_ref()
    }
}

impl std::fmt::Debug for ProfilerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfilerSession")
            .field("application_id", &self.inner.application_id)
            .field("enabled", &self.is_enabled())
            .field("num_callsites", &self.num_callsites())
            .finish_non_exhaustive()
    }
}

// ----------------------------------------------------------------------------

/// Ends a block when dropped.
///
/// Returned by [`ProfilerSession::scope`]; runs on all exit paths,
/// including unwinding panics, so the per-thread stack can never leak an
/// unterminated entry.
#[must_use = "the block ends when this scope is dropped"]
pub struct BlockScope<'a> {
    session: &'a ProfilerSession,
}

impl Drop for BlockScope<'_> {
    fn drop(&mut self) {
        if self.session.end_block().is_err() {
            // Someone called end_block() by hand inside this scope.
            bp_log::warn_once!(
                "BlockScope dropped with no open block - begin/end calls are unbalanced"
            );
        }
    }
}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use bp_types::{Color, StatusFlags};

    use super::{ProfilerSession, ProfilerSessionBuilder};
    use crate::block_stack::UnbalancedBlockError;

    fn begin(session: &ProfilerSession, name: &str, flags: StatusFlags) {
        session.begin_block(name, file!(), line!(), Color::DEFAULT, flags);
    }

    fn drained_names(session: &ProfilerSession) -> Vec<String> {
        session
            .drain_backlog()
            .iter()
            .map(|record| record.name().to_owned())
            .collect()
    }

    #[test]
    fn session_impl_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ProfilerSession>();
    }

    #[test]
    fn records_are_emitted_innermost_first() {
        let session = ProfilerSessionBuilder::new("test").enabled(true).buffered();

        begin(&session, "A", StatusFlags::ON);
        begin(&session, "B", StatusFlags::ON);
        begin(&session, "C", StatusFlags::ON);
        session.end_block().unwrap();
        session.end_block().unwrap();
        session.end_block().unwrap();

        let records = session.drain_backlog();
        let names: Vec<&str> = records.iter().map(|record| record.name()).collect();
        assert_eq!(names, vec!["C", "B", "A"]);

        // Emission order is reverse start order: the innermost block began
        // last and finished first.
        assert!(records[0].start >= records[1].start);
        assert!(records[1].start >= records[2].start);

        // And every child is contained in its parent:
        assert!(records[0].end() <= records[1].end());
        assert!(records[1].end() <= records[2].end());
    }

    #[test]
    fn suppression_propagates_to_descendants() {
        let session = ProfilerSessionBuilder::new("test").enabled(true).buffered();

        begin(&session, "A", StatusFlags::ON);
        begin(&session, "B", StatusFlags::ON_WITHOUT_CHILDREN);
        begin(&session, "C", StatusFlags::ON);
        session.end_block().unwrap(); // C: suppressed by B
        session.end_block().unwrap(); // B: records
        session.end_block().unwrap(); // A: records

        assert_eq!(drained_names(&session), vec!["B", "A"]);
    }

    #[test]
    fn suppression_is_sticky_through_grandchildren() {
        let session = ProfilerSessionBuilder::new("test").enabled(true).buffered();

        begin(&session, "A", StatusFlags::ON_WITHOUT_CHILDREN);
        begin(&session, "B", StatusFlags::OFF);
        begin(&session, "C", StatusFlags::FORCE_ON);
        session.end_block().unwrap();
        session.end_block().unwrap();
        session.end_block().unwrap();

        // Neither B's OFF nor C's FORCE_ON matter below A.
        assert_eq!(drained_names(&session), vec!["A"]);
    }

    #[test]
    fn off_blocks_run_but_do_not_record() {
        let session = ProfilerSessionBuilder::new("test").enabled(true).buffered();

        let mut ran = false;
        session.run_block(
            "quiet",
            || {
                ran = true;
            },
            Color::DEFAULT,
            StatusFlags::OFF,
            file!(),
            line!(),
        );

        assert!(ran);
        assert_eq!(session.drain_backlog().len(), 0);
    }

    #[test]
    fn force_on_round_trips_on_the_record() {
        let session = ProfilerSessionBuilder::new("test").enabled(true).buffered();

        begin(&session, "forced", StatusFlags::FORCE_ON);
        session.end_block().unwrap();

        let records = session.drain_backlog();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].flags, StatusFlags::FORCE_ON);
        assert!(records[0].flags.contains(StatusFlags::ON));
    }

    #[test]
    fn unbalanced_end_is_an_error_and_leaves_the_stack_empty() {
        let session = ProfilerSessionBuilder::new("test").enabled(true).buffered();

        assert_eq!(session.end_block(), Err(UnbalancedBlockError));
        assert_eq!(session.open_depth(), 0);
        assert_eq!(session.end_block(), Err(UnbalancedBlockError));

        // A balanced pair still works afterwards:
        begin(&session, "A", StatusFlags::ON);
        session.end_block().unwrap();
        assert_eq!(drained_names(&session), vec!["A"]);
    }

    #[test]
    fn disabled_session_is_a_noop() {
        let session = ProfilerSessionBuilder::new("test").enabled(false).buffered();
        assert!(!session.is_enabled());

        begin(&session, "A", StatusFlags::ON);
        begin(&session, "B", StatusFlags::ON);
        session.end_block().unwrap();
        session.end_block().unwrap();
        session.end_block().unwrap(); // not even this is an error when disabled

        assert_eq!(session.num_callsites(), 0, "no registry growth");
        assert_eq!(session.open_depth(), 0);
        assert_eq!(session.drain_backlog().len(), 0);
    }

    #[test]
    fn set_enabled_toggles_recording() {
        let session = ProfilerSessionBuilder::new("test").enabled(true).buffered();

        begin(&session, "on", StatusFlags::ON);
        session.end_block().unwrap();

        session.set_enabled(false);
        begin(&session, "off", StatusFlags::ON);
        session.end_block().unwrap();

        session.set_enabled(true);
        begin(&session, "on_again", StatusFlags::ON);
        session.end_block().unwrap();

        assert_eq!(drained_names(&session), vec!["on", "on_again"]);
    }

    #[test]
    fn disabling_mid_block_keeps_pairing_balanced() {
        let session = ProfilerSessionBuilder::new("test").enabled(true).buffered();

        begin(&session, "outer", StatusFlags::ON);
        session.set_enabled(false);

        // This pair must consume its own frame, not "outer"'s.
        begin(&session, "invisible", StatusFlags::ON);
        assert_eq!(session.open_depth(), 2);
        session.end_block().unwrap();
        assert_eq!(session.open_depth(), 1, "outer must still be open");

        session.set_enabled(true);
        session.end_block().unwrap();
        assert_eq!(session.open_depth(), 0);

        assert_eq!(drained_names(&session), vec!["outer"]);
        assert_eq!(session.num_callsites(), 1, "\"invisible\" is never interned");
    }

    #[test]
    fn scope_ends_block_on_panic() {
        let session = ProfilerSessionBuilder::new("test").enabled(true).buffered();

        let result: Result<(), _> = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            session.run_block(
                "exploding",
                || panic!("boom"),
                Color::DEFAULT,
                StatusFlags::ON,
                file!(),
                line!(),
            )
        }));

        assert!(result.is_err(), "the panic must reach the caller");
        assert_eq!(session.open_depth(), 0, "the block must still have ended");
        assert_eq!(drained_names(&session), vec!["exploding"]);
    }

    #[test]
    fn clones_share_registry_and_sink() {
        let session = ProfilerSessionBuilder::new("test").enabled(true).buffered();
        let clone = session.clone();

        begin(&session, "A", StatusFlags::ON);
        session.end_block().unwrap();
        begin(&clone, "A", StatusFlags::ON);
        clone.end_block().unwrap();

        assert_eq!(session.num_callsites(), 1);
        assert_eq!(drained_names(&session), vec!["A", "A"]);
    }

    #[test]
    fn threads_have_independent_stacks() {
        let session = ProfilerSessionBuilder::new("test").enabled(true).buffered();

        begin(&session, "main", StatusFlags::ON);

        {
            let session = session.clone();
            std::thread::Builder::new()
                .name("worker".to_owned())
                .spawn(move || {
                    // This thread's stack is empty even though "main" is
                    // open on the spawning thread.
                    assert_eq!(session.open_depth(), 0);
                    begin(&session, "worker_block", StatusFlags::ON);
                    session.end_block().unwrap();
                })
                .unwrap()
                .join()
                .unwrap();
        }

        session.end_block().unwrap();

        let mut names = drained_names(&session);
        names.sort();
        assert_eq!(names, vec!["main", "worker_block"]);
    }

    #[test]
    fn memory_sink_stays_readable_while_recording() {
        let (session, storage) = ProfilerSessionBuilder::new("test").enabled(true).memory();

        begin(&session, "A", StatusFlags::ON);
        session.end_block().unwrap();
        assert_eq!(storage.read().len(), 1);

        begin(&session, "B", StatusFlags::ON);
        session.end_block().unwrap();

        let records = storage.take();
        assert_eq!(records.len(), 2);
        assert_eq!(storage.read().len(), 0);

        // drain_backlog is not how MemorySink hands out data:
        assert_eq!(session.drain_backlog().len(), 0);
    }
}
