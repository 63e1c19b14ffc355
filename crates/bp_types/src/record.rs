use crate::{BlockDescriptor, Color, Duration, StatusFlags, Time};

/// A finished timed block, as handed to a sink.
///
/// This is a plain value; once a sink has accepted it, the tracing core
/// keeps no reference to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockRecord {
    /// The interned callsite this block was opened from.
    pub descriptor: &'static BlockDescriptor,

    /// When the block began, relative to the session epoch.
    pub start: Time,

    /// How long the block was open.
    pub duration: Duration,

    /// The color the block was opened with.
    pub color: Color,

    /// The flags the block was opened with, verbatim.
    ///
    /// In particular [`StatusFlags::FORCE_ON`] survives here unchanged, so a
    /// layer above the sink can implement force-on filtering.
    pub flags: StatusFlags,
}

impl BlockRecord {
    /// Block name, from the descriptor.
    #[inline]
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// When the block ended, relative to the session epoch.
    #[inline]
    pub fn end(&self) -> Time {
        self.start + self.duration
    }
}
