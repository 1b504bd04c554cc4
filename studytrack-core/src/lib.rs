//! StudyTrack Core Library
//!
//! Curriculum models, the progress merge, the mutation API and the sync
//! engine shared by StudyTrack clients.

pub mod merge;
pub mod models;
pub mod remote;
pub mod store;
pub mod sync;

pub use merge::{merge, merge_progress, MergePolicy};
pub use models::{
    Curriculum, Meta, MetaPatch, Resource, ResourceKind, Section, Topic, TopicStatus, Track,
    TrackPatch, META_KEY,
};
pub use remote::{HttpRemoteStore, MemoryRemoteStore, RemoteError, RemoteStore, SESSION_COOKIE};
pub use store::{CurriculumStore, StoreError, TopicAddr};
pub use sync::{LoadOutcome, SaveReport, SyncEngine, DEFAULT_DEBOUNCE};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
