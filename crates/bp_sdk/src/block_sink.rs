use std::sync::Arc;

use parking_lot::RwLock;

use bp_types::BlockRecord;

/// Where a session sends its completed block records.
///
/// Implementations must not block the tracing thread for unbounded time:
/// buffering and asynchronous delivery are the sink's responsibility, not
/// the begin/end path's. Sink-internal failures must be swallowed or logged,
/// never surfaced to instrumented code.
pub trait BlockSink: Send + Sync + 'static {
    /// Accept this completed block record.
    fn accept(&self, record: BlockRecord);

    /// Accept all these completed block records.
    #[inline]
    fn accept_all(&self, records: Vec<BlockRecord>) {
        for record in records {
            self.accept(record);
        }
    }

    /// Drain all buffered [`BlockRecord`]s and return them.
    ///
    /// Only applies to sinks that maintain a backlog.
    #[inline]
    fn drain_backlog(&self) -> Vec<BlockRecord> {
        vec![]
    }

    /// Blocks until all pending records have been fully delivered.
    fn flush_blocking(&self);
}

// ----------------------------------------------------------------------------

/// Store records in memory until you call [`BlockSink::drain_backlog`].
#[derive(Default)]
pub struct BufferedSink(parking_lot::Mutex<Vec<BlockRecord>>);

impl BufferedSink {
    /// An empty buffer.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlockSink for BufferedSink {
    #[inline]
    fn accept(&self, record: BlockRecord) {
        self.0.lock().push(record);
    }

    #[inline]
    fn accept_all(&self, mut records: Vec<BlockRecord>) {
        self.0.lock().append(&mut records);
    }

    #[inline]
    fn drain_backlog(&self) -> Vec<BlockRecord> {
        std::mem::take(&mut self.0.lock())
    }

    #[inline]
    fn flush_blocking(&self) {}
}

// ----------------------------------------------------------------------------

/// Store records directly in shared memory.
///
/// Very similar to [`BufferedSink`], but a real endpoint: `drain_backlog`
/// does nothing, and the raw storage stays accessible through
/// [`MemorySinkStorage`] handles even while the session keeps recording.
#[derive(Default)]
pub struct MemorySink(MemorySinkStorage);

impl MemorySink {
    /// Access the shared storage.
    #[inline]
    pub fn storage(&self) -> MemorySinkStorage {
        self.0.clone()
    }
}

impl BlockSink for MemorySink {
    #[inline]
    fn accept(&self, record: BlockRecord) {
        self.0.write().push(record);
    }

    #[inline]
    fn accept_all(&self, mut records: Vec<BlockRecord>) {
        self.0.write().append(&mut records);
    }

    #[inline]
    fn flush_blocking(&self) {}
}

/// The storage used by [`MemorySink`].
#[derive(Default, Clone)]
pub struct MemorySinkStorage(Arc<RwLock<Vec<BlockRecord>>>);

impl MemorySinkStorage {
    /// Write access to the inner array of records.
    #[inline]
    fn write(&self) -> parking_lot::RwLockWriteGuard<'_, Vec<BlockRecord>> {
        self.0.write()
    }

    /// Read access to the inner array of records.
    #[inline]
    pub fn read(&self) -> parking_lot::RwLockReadGuard<'_, Vec<BlockRecord>> {
        self.0.read()
    }

    /// Consumes and returns the inner array of records.
    #[inline]
    pub fn take(&self) -> Vec<BlockRecord> {
        std::mem::take(&mut *self.0.write())
    }
}

// ----------------------------------------------------------------------------

/// A sink that discards everything. Used by disabled sessions.
struct NoopSink;

impl BlockSink for NoopSink {
    #[inline]
    fn accept(&self, _record: BlockRecord) {}

    #[inline]
    fn flush_blocking(&self) {}
}

/// A sink that discards all records.
pub fn disabled() -> Box<dyn BlockSink> {
    Box::new(NoopSink)
}
