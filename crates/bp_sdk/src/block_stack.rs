//! Per-thread stacks of currently open blocks.
//!
//! Each thread owns one stack per session, so begin/end never synchronize
//! with other threads. Strict nesting is the core invariant: pops happen in
//! exact reverse order of pushes.

use std::cell::RefCell;

use nohash_hasher::IntMap;

use bp_types::{BlockDescriptor, Color, ResolvedStatus, StatusFlags, Time};

use crate::session::SessionId;

/// `end_block()` was called on a thread with no matching `begin_block()`.
///
/// This is a programming defect in the instrumentation, not a runtime
/// condition: silently recovering would corrupt the timing of every
/// ancestor block, so it is propagated to the caller instead.
#[derive(thiserror::Error, Clone, Copy, Debug, PartialEq, Eq)]
#[error("end_block() called with no open block on this thread (begin/end mismatch)")]
pub struct UnbalancedBlockError;

/// A block that has begun on this thread but not yet ended.
#[derive(Clone, Copy)]
pub(crate) struct OpenBlock {
    /// `None` for blocks begun while the session was disabled: such frames
    /// keep begin/end pairing balanced across `set_enabled` toggles, but
    /// never record and never touch the registry.
    pub descriptor: Option<&'static BlockDescriptor>,

    /// Monotonic timestamp captured at push time.
    pub start: Time,

    /// Recording decision resolved at push time, inherited suppression
    /// included.
    pub status: ResolvedStatus,

    /// Color this block was opened with.
    pub color: Color,

    /// Flags this block was opened with, verbatim.
    pub flags: StatusFlags,
}

impl OpenBlock {
    /// A frame for a block begun while the session was disabled.
    ///
    /// Invisible in the output: it never records, and it passes its
    /// parent's suppression through unchanged so that blocks begun after
    /// re-enabling still resolve against the nearest traced ancestor.
    pub fn skipped(parent: ResolvedStatus) -> Self {
        Self {
            descriptor: None,
            start: Time::ZERO,
            status: ResolvedStatus {
                record: false,
                suppress_children: parent.suppress_children,
            },
            color: Color::NONE,
            flags: StatusFlags::OFF,
        }
    }
}

// ----------------------------------------------------------------------------

/// Thread-local data: one stack of open blocks per session.
#[derive(Default)]
pub(crate) struct ThreadStacks {
    stacks: IntMap<SessionId, Vec<OpenBlock>>,
}

impl ThreadStacks {
    /// The effective status a new block should resolve against: the
    /// top-of-stack entry's, or "nothing inherited" for an empty stack.
    pub fn parent_status(session: SessionId) -> ResolvedStatus {
        Self::with(|stacks| {
            stacks
                .stacks
                .get(&session)
                .and_then(|stack| stack.last())
                .map_or_else(ResolvedStatus::default, |open| open.status)
        })
    }

    pub fn push(session: SessionId, block: OpenBlock) {
        Self::with(|stacks| stacks.stacks.entry(session).or_default().push(block));
    }

    /// Pop the innermost open block, or fail (leaving the stack unchanged)
    /// if there is none.
    pub fn pop(session: SessionId) -> Result<OpenBlock, UnbalancedBlockError> {
        Self::with(|stacks| {
            stacks
                .stacks
                .get_mut(&session)
                .and_then(Vec::pop)
                .ok_or(UnbalancedBlockError)
        })
    }

    /// How many blocks are currently open on this thread for this session.
    pub fn depth(session: SessionId) -> usize {
        Self::with(|stacks| stacks.stacks.get(&session).map_or(0, Vec::len))
    }

    /// Get access to the thread-local [`ThreadStacks`].
    fn with<R>(f: impl FnOnce(&mut Self) -> R) -> R {
        thread_local! {
            static THREAD_STACKS: RefCell<Option<ThreadStacks>> = const { RefCell::new(None) };
        }

        THREAD_STACKS.with(|stacks| {
            let mut stacks = stacks.borrow_mut();
            let stacks = stacks.get_or_insert_with(Self::default);
            f(stacks)
        })
    }
}

// ----------------------------------------------------------------------------
