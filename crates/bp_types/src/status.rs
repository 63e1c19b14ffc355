bitflags::bitflags! {
    /// Controls whether a block records, and whether it suppresses recording
    /// for its descendants.
    ///
    /// The bit layout is the easy_profiler one, so captured traces stay
    /// interpretable by tooling that knows these values:
    ///
    /// | value | bits |
    /// |---|---|
    /// | `OFF` | `0` |
    /// | `ON` | `1` |
    /// | `FORCE_ON` | `ON \| 2` |
    /// | `OFF_RECURSIVE` | `4` |
    /// | `ON_WITHOUT_CHILDREN` | `ON \| OFF_RECURSIVE` |
    /// | `FORCE_ON_WITHOUT_CHILDREN` | `FORCE_ON \| OFF_RECURSIVE` |
    ///
    /// `FORCE_ON` is resolved identically to `ON` by this crate; the extra
    /// bit rides along unchanged on descriptors and records so a higher
    /// layer can use it to bypass session-level filtering.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct StatusFlags: u8 {
        /// Record this block.
        const ON = 1;

        /// Record this block even if a higher layer filters blocks out.
        const FORCE_ON = Self::ON.bits() | 2;

        /// Suppress recording for all descendant blocks, regardless of
        /// their own flags.
        const OFF_RECURSIVE = 4;

        /// Record this block, but none of its descendants.
        const ON_WITHOUT_CHILDREN = Self::ON.bits() | Self::OFF_RECURSIVE.bits();

        /// [`Self::FORCE_ON`] combined with [`Self::OFF_RECURSIVE`].
        const FORCE_ON_WITHOUT_CHILDREN = Self::FORCE_ON.bits() | Self::OFF_RECURSIVE.bits();
    }
}

impl StatusFlags {
    /// Don't record this block (descendants are unaffected).
    pub const OFF: Self = Self::empty();

    /// Resolve the effective recording status of a block, given the
    /// effective status of its parent.
    ///
    /// Inherited suppression is sticky: once an ancestor asked for
    /// `OFF_RECURSIVE`, every descendant resolves to "not recording,
    /// keep suppressing", no matter what its own flags say.
    ///
    /// This is a pure function of its inputs.
    #[inline]
    pub fn resolve(self, parent: ResolvedStatus) -> ResolvedStatus {
        if parent.suppress_children {
            ResolvedStatus {
                record: false,
                suppress_children: true,
            }
        } else {
            ResolvedStatus {
                record: self.contains(Self::ON),
                suppress_children: self.contains(Self::OFF_RECURSIVE),
            }
        }
    }
}

impl Default for StatusFlags {
    #[inline]
    fn default() -> Self {
        Self::ON
    }
}

// ----------------------------------------------------------------------------

/// The effective recording status of one open block, resolved at the moment
/// it was pushed on the stack.
///
/// The default value (`record: false`, `suppress_children: false`) is what an
/// empty stack presents as "parent" status: nothing inherited.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResolvedStatus {
    /// Emit a record for this block when it ends?
    pub record: bool,

    /// Are descendants of this block barred from recording?
    pub suppress_children: bool,
}

// ----------------------------------------------------------------------------
