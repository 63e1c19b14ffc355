//! Hierarchical block profiling: named, nestable, filterable timed blocks.
//!
//! This crate is a facade re-exporting the blockprof SDK under one name.
//!
//! ```
//! let session = blockprof::ProfilerSessionBuilder::new("my_app").buffered();
//!
//! {
//!     blockprof::profile_block!(session, "frame");
//!     {
//!         blockprof::profile_block!(session, "physics");
//!     }
//! }
//!
//! for record in session.drain_backlog() {
//!     println!("{} took {}", record.name(), record.duration);
//! }
//! ```
//!
//! ## Feature flags
#![doc = document_features::document_features!()]
//!

// NOTE: have a look at `bp_sdk/src/lib.rs` for an accurate listing of all
// these symbols.
pub use bp_sdk::*;

/// Set up text logging for applications that embed blockprof.
#[cfg(not(target_arch = "wasm32"))]
pub use bp_log::setup_native_logging;
