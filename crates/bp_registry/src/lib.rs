//! Callsite-keyed interning of block descriptors.
//!
//! Fast lookup of a `&'static BlockDescriptor` from a (name, file, line)
//! triple. Implemented as a pre-hashed map: we pay the cost of hashing the
//! triple once, then do cheap `u64` lookups in a map that doesn't rehash
//! its keys.
//!
//! Descriptors grow monotonically for the lifetime of the registry and are
//! never removed, mirroring how profiled callsites behave in practice.

#![warn(missing_docs)]

use std::hash::BuildHasher as _;

use nohash_hasher::IntMap;
use parking_lot::RwLock;

use bp_types::{BlockDescriptor, Color, StatusFlags};

/// Interns [`BlockDescriptor`]s, one per distinct (name, file, line).
///
/// Thread-safe: many threads can intern concurrently; repeat interns of a
/// known callsite only take a read lock.
pub struct BlockRegistry {
    hasher: ahash::RandomState,
    map: RwLock<IntMap<u64, &'static BlockDescriptor>>,
}

impl BlockRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            hasher: ahash::RandomState::new(),
            map: RwLock::new(IntMap::default()),
        }
    }

    /// Look up or create the descriptor for a callsite.
    ///
    /// Identity is (name, file, line). `color` and `flags` are the callsite
    /// defaults and are only consulted when the descriptor is first created;
    /// later interns of the same callsite return the original descriptor
    /// unchanged.
    pub fn intern(
        &self,
        name: &str,
        file: &str,
        line: u32,
        color: Color,
        flags: StatusFlags,
    ) -> &'static BlockDescriptor {
        let key = self.hasher.hash_one((name, file, line));

        // Fast path: the callsite has been seen before.
        if let Some(descriptor) = self.map.read().get(&key) {
            Self::check_collision(descriptor, name, file, line);
            return descriptor;
        }

        // Slow path. The entry API re-checks under the write lock, so a
        // racing intern of the same callsite still yields one descriptor.
        let mut map = self.map.write();
        let descriptor = *map.entry(key).or_insert_with(|| {
            Box::leak(Box::new(BlockDescriptor {
                name: name.to_owned(),
                file: file.to_owned(),
                line,
                color,
                flags,
            }))
        });
        Self::check_collision(descriptor, name, file, line);
        descriptor
    }

    /// Debug-build check that a key hit really is the requested callsite.
    ///
    /// Two distinct (name, file, line) triples hashing to the same `u64`
    /// would silently alias their callsites; catch that here rather than in
    /// the profile output.
    #[inline]
    fn check_collision(descriptor: &BlockDescriptor, name: &str, file: &str, line: u32) {
        debug_assert!(
            descriptor.name == name && descriptor.file == file && descriptor.line == line,
            "hash collision: {descriptor:?} aliases {name:?} ({file}:{line})"
        );
    }

    /// Number of distinct callsites interned so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    /// Has nothing been interned yet?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }
}

impl Default for BlockRegistry {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BlockRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockRegistry")
            .field("len", &self.len())
            .finish()
    }
}

// ----------------------------------------------------------------------------
