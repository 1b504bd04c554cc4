mod curriculum;
mod defaults;
mod status;
mod topic;
mod track;

pub use curriculum::{Curriculum, Meta, MetaPatch, META_KEY};
pub use status::TopicStatus;
pub use topic::{Resource, ResourceKind, Topic};
pub use track::{Section, Track, TrackPatch};
