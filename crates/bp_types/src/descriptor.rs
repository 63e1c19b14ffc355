use crate::{Color, StatusFlags};

/// Immutable metadata for one profiled callsite.
///
/// One descriptor exists per distinct (name, file, line) triple; it is
/// created the first time that callsite begins a block and lives for the
/// rest of the session. Interning is handled by `bp_registry`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BlockDescriptor {
    /// Human-readable block name, e.g. `"Scene::update"`.
    pub name: String,

    /// Source file of the callsite.
    pub file: String,

    /// 1-based line number of the callsite.
    pub line: u32,

    /// Default color for blocks opened from this callsite.
    pub color: Color,

    /// Default status flags for blocks opened from this callsite.
    pub flags: StatusFlags,
}

impl BlockDescriptor {
    /// `file:line`, the way compilers print source locations.
    #[inline]
    pub fn location(&self) -> String {
        format!("{}:{}", self.file, self.line)
    }
}

impl std::fmt::Debug for BlockDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} ({}:{})", self.name, self.file, self.line)
    }
}
