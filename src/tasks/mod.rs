//! Tasks Module
//!
//! Background maintenance tasks for the cache store.

mod cleanup;

pub use cleanup::spawn_cleanup_task;
