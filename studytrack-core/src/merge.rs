//! Reconciling a remote curriculum document with the local one.
//!
//! Two policies exist:
//! - [`MergePolicy::Replace`]: the remote document wins outright. Used when the
//!   local document is only a seed.
//! - [`MergePolicy::Structural`]: the local document owns the shape (tracks,
//!   sections, topic order, descriptive fields) and the remote document owns
//!   progress. For every topic present on both sides, `status`, `repoLink` and
//!   `lastUpdated` are copied from remote. Remote-only tracks, sections and
//!   topics are dropped.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::{Curriculum, Topic};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergePolicy {
    Replace,
    #[default]
    Structural,
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergePolicy::Replace => write!(f, "replace"),
            MergePolicy::Structural => write!(f, "structural"),
        }
    }
}

impl FromStr for MergePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "replace" => Ok(MergePolicy::Replace),
            "structural" => Ok(MergePolicy::Structural),
            _ => Err(format!(
                "Invalid merge policy '{}'. Valid options: replace, structural",
                s
            )),
        }
    }
}

/// Applies `remote` to `local` under `policy`.
pub fn merge(policy: MergePolicy, local: &mut Curriculum, remote: &Curriculum) {
    match policy {
        MergePolicy::Replace => *local = remote.clone(),
        MergePolicy::Structural => {
            merge_progress(local, remote);
        }
    }
}

/// Copies progress fields from `remote` into every matching topic of `local`.
///
/// Returns the number of topics whose progress was taken from remote.
pub fn merge_progress(local: &mut Curriculum, remote: &Curriculum) -> usize {
    let mut adopted = 0;

    for (track_id, track) in local.tracks.iter_mut() {
        let Some(remote_track) = remote.tracks.get(track_id) else {
            continue;
        };

        adopted += adopt_topics(&mut track.topics, &remote_track.topics);

        for (section_id, section) in track.sections.iter_mut() {
            if let Some(remote_section) = remote_track.sections.get(section_id) {
                adopted += adopt_topics(&mut section.topics, &remote_section.topics);
            }
        }
    }

    adopted
}

fn adopt_topics(local: &mut [Topic], remote: &[Topic]) -> usize {
    let mut adopted = 0;
    for topic in local.iter_mut() {
        if let Some(remote_topic) = remote.iter().find(|r| r.name == topic.name) {
            topic.adopt_progress(remote_topic);
            adopted += 1;
        }
    }
    adopted
}
