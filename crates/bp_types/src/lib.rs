//! The basic building blocks of a blockprof trace.
//!
//! Every type in here is a plain value type: block status flags and the rules
//! for resolving them down a stack of nested blocks, block colors, monotonic
//! timestamps and durations, block descriptors, and the completed-block
//! records that get handed to a sink.
//!
//! ## Feature flags
#![doc = document_features::document_features!()]
//!

mod color;
mod descriptor;
mod record;
mod status;
mod time;

pub use self::color::Color;
pub use self::descriptor::BlockDescriptor;
pub use self::record::BlockRecord;
pub use self::status::{ResolvedStatus, StatusFlags};
pub use self::time::{Duration, Time};

/// Re-exports of the crates we build on.
pub mod external {
    pub use web_time;
}
