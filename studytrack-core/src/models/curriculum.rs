use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::track::Track;

/// Key reserved for the document's meta record.
pub const META_KEY: &str = "meta";

/// Study plan metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Meta {
    pub goal: String,
    pub duration: String,
    pub study_time: String,
}

/// Partial update for [`Meta`]. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct MetaPatch {
    pub goal: Option<String>,
    pub duration: Option<String>,
    pub study_time: Option<String>,
}

impl Meta {
    pub fn apply(&mut self, patch: MetaPatch) {
        if let Some(goal) = patch.goal {
            self.goal = goal;
        }
        if let Some(duration) = patch.duration {
            self.duration = duration;
        }
        if let Some(study_time) = patch.study_time {
            self.study_time = study_time;
        }
    }
}

/// The whole curriculum document.
///
/// On the wire tracks sit beside `meta` at the top level:
///
/// ```text
/// {
///   "meta": { "goal": "...", "duration": "...", "studyTime": "..." },
///   "LLD": { "title": "...", "topics": [...] },
///   "AWS": { "title": "...", "topics": [...] }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Curriculum {
    #[serde(default)]
    pub meta: Meta,
    #[serde(flatten)]
    pub tracks: IndexMap<String, Track>,
}

impl Curriculum {
    pub fn new(meta: Meta) -> Self {
        Self {
            meta,
            tracks: IndexMap::new(),
        }
    }

    pub fn with_track(mut self, id: impl Into<String>, track: Track) -> Self {
        self.tracks.insert(id.into(), track);
        self
    }

    pub fn track(&self, id: &str) -> Option<&Track> {
        self.tracks.get(id)
    }

    /// Returns `(completed, total)` over every topic in the document.
    pub fn progress(&self) -> (usize, usize) {
        self.tracks.values().fold((0, 0), |(done, total), track| {
            let (d, t) = track.progress();
            (done + d, total + t)
        })
    }
}

impl fmt::Display for Curriculum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.meta.goal.is_empty() {
            writeln!(f, "Goal: {}", self.meta.goal)?;
        }
        if !self.meta.duration.is_empty() {
            writeln!(f, "Duration: {}", self.meta.duration)?;
        }
        if !self.meta.study_time.is_empty() {
            writeln!(f, "Study time: {}", self.meta.study_time)?;
        }

        for (id, track) in &self.tracks {
            let (done, total) = track.progress();
            writeln!(f)?;
            writeln!(f, "{} - {} [{}/{}]", id, track.title, done, total)?;
            writeln!(f, "{}", "=".repeat(30))?;
            for topic in &track.topics {
                writeln!(f, "  {}", topic)?;
            }
            for (section_id, section) in &track.sections {
                writeln!(f, "  {} ({})", section.title, section_id)?;
                for topic in &section.topics {
                    writeln!(f, "    {}", topic)?;
                }
            }
        }

        Ok(())
    }
}
