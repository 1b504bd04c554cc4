use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::topic::Topic;

/// Optional mid-level grouping of topics within a track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    #[serde(default)]
    pub topics: Vec<Topic>,
}

impl Section {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            topics: Vec::new(),
        }
    }

    pub fn with_topic(mut self, topic: Topic) -> Self {
        self.topics.push(topic);
        self
    }
}

/// Top-level curriculum grouping, e.g. "LLD" or "AWS".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default)]
    pub topics: Vec<Topic>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub sections: IndexMap<String, Section>,
}

/// Partial update for a track. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct TrackPatch {
    pub title: Option<String>,
    pub duration: Option<String>,
}

impl Track {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            duration: None,
            topics: Vec::new(),
            sections: IndexMap::new(),
        }
    }

    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = Some(duration.into());
        self
    }

    pub fn with_topic(mut self, topic: Topic) -> Self {
        self.topics.push(topic);
        self
    }

    pub fn with_section(mut self, id: impl Into<String>, section: Section) -> Self {
        self.sections.insert(id.into(), section);
        self
    }

    pub fn apply(&mut self, patch: TrackPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(duration) = patch.duration {
            self.duration = Some(duration);
        }
    }

    /// Topic list addressed by `section`: the track's own list for `None`,
    /// otherwise the named section's list.
    pub fn topics(&self, section: Option<&str>) -> Option<&Vec<Topic>> {
        match section {
            None => Some(&self.topics),
            Some(id) => self.sections.get(id).map(|s| &s.topics),
        }
    }

    pub fn topics_mut(&mut self, section: Option<&str>) -> Option<&mut Vec<Topic>> {
        match section {
            None => Some(&mut self.topics),
            Some(id) => self.sections.get_mut(id).map(|s| &mut s.topics),
        }
    }

    /// Iterates every topic in the track, direct topics first.
    pub fn all_topics(&self) -> impl Iterator<Item = &Topic> {
        self.topics
            .iter()
            .chain(self.sections.values().flat_map(|s| s.topics.iter()))
    }

    /// Returns `(completed, total)` over all topics in the track.
    pub fn progress(&self) -> (usize, usize) {
        self.all_topics().fold((0, 0), |(done, total), topic| {
            let done = done + usize::from(topic.status.is_completed());
            (done, total + 1)
        })
    }
}
