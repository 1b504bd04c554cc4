//! Curriculum synchronization with the remote store.
//!
//! ## Protocol
//!
//! 1. The engine starts from the bundled curriculum.
//! 2. `load` fetches the remote document and applies it under the configured
//!    [`MergePolicy`](crate::merge::MergePolicy). If nothing is stored yet the
//!    local document (or the seed file) is pushed immediately.
//! 3. Every successful mutation queues a whole-document save. Saves within the
//!    debounce window collapse into one carrying the latest snapshot.
//! 4. Failed saves are logged and reported by `flush`; local state is kept and
//!    the next save carries it again.

mod engine;
mod saver;

pub use engine::{LoadOutcome, SyncEngine};
pub use saver::{DebouncedSaver, SaveReport, DEFAULT_DEBOUNCE};
