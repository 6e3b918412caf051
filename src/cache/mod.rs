//! Cache Module
//!
//! TTL-bound hash storage and the value codec for string-only backends.

pub mod codec;
mod entry;
mod stats;
mod store;


// Re-export public types
pub use codec::FieldValue;
pub use entry::HashEntry;
pub use stats::StoreStats;
pub use store::{glob_match, CacheStore, MemoryStore};
