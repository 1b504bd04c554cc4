//! Owner of the in-memory curriculum document and its mutation API.
//!
//! Every mutation either applies completely or returns an error and leaves
//! the document untouched. Addressing a track, section or topic that does not
//! exist is reported as [`StoreError::NotFound`].

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{
    Curriculum, MetaPatch, Section, Topic, TopicStatus, Track, TrackPatch, META_KEY,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Key '{0}' is reserved and cannot be used as a track id")]
    ReservedKey(String),
}

/// Location of a topic list: a track, optionally narrowed to one section.
#[derive(Debug, Clone, Copy)]
pub struct TopicAddr<'a> {
    pub track: &'a str,
    pub section: Option<&'a str>,
}

impl<'a> TopicAddr<'a> {
    pub fn track(track: &'a str) -> Self {
        Self {
            track,
            section: None,
        }
    }

    pub fn section(track: &'a str, section: &'a str) -> Self {
        Self {
            track,
            section: Some(section),
        }
    }

    fn describe(&self) -> String {
        match self.section {
            Some(section) => format!("{}/{}", self.track, section),
            None => self.track.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CurriculumStore {
    doc: Curriculum,
}

impl CurriculumStore {
    pub fn new(doc: Curriculum) -> Self {
        Self { doc }
    }

    pub fn document(&self) -> &Curriculum {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut Curriculum {
        &mut self.doc
    }

    pub fn replace(&mut self, doc: Curriculum) {
        self.doc = doc;
    }

    pub fn update_meta(&mut self, patch: MetaPatch) {
        self.doc.meta.apply(patch);
    }

    /// Inserts a track, overwriting any track with the same id.
    pub fn add_track(&mut self, id: &str, track: Track) -> Result<(), StoreError> {
        if id == META_KEY {
            return Err(StoreError::ReservedKey(id.to_string()));
        }
        self.doc.tracks.insert(id.to_string(), track);
        Ok(())
    }

    pub fn update_track(&mut self, id: &str, patch: TrackPatch) -> Result<(), StoreError> {
        self.track_mut(id)?.apply(patch);
        Ok(())
    }

    pub fn delete_track(&mut self, id: &str) -> Result<Track, StoreError> {
        self.doc
            .tracks
            .shift_remove(id)
            .ok_or_else(|| StoreError::NotFound(format!("track '{}'", id)))
    }

    /// Inserts a section into a track, overwriting any section with the same id.
    pub fn add_section(
        &mut self,
        track_id: &str,
        section_id: &str,
        section: Section,
    ) -> Result<(), StoreError> {
        self.track_mut(track_id)?
            .sections
            .insert(section_id.to_string(), section);
        Ok(())
    }

    pub fn delete_section(&mut self, track_id: &str, section_id: &str) -> Result<Section, StoreError> {
        self.track_mut(track_id)?
            .sections
            .shift_remove(section_id)
            .ok_or_else(|| {
                StoreError::NotFound(format!("section '{}/{}'", track_id, section_id))
            })
    }

    /// Appends a topic, or replaces the topic with the same name in place.
    pub fn add_topic(&mut self, addr: TopicAddr<'_>, topic: Topic) -> Result<(), StoreError> {
        let topics = self.topics_mut(addr)?;
        match topics.iter_mut().find(|t| t.name == topic.name) {
            Some(existing) => *existing = topic,
            None => topics.push(topic),
        }
        Ok(())
    }

    pub fn delete_topic(&mut self, addr: TopicAddr<'_>, name: &str) -> Result<Topic, StoreError> {
        let topics = self.topics_mut(addr)?;
        let index = topics
            .iter()
            .position(|t| t.name == name)
            .ok_or_else(|| topic_not_found(addr, name))?;
        Ok(topics.remove(index))
    }

    /// Marks a topic completed with a link to the supporting work.
    pub fn complete_topic(
        &mut self,
        addr: TopicAddr<'_>,
        name: &str,
        repo_link: &str,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.topic_mut(addr, name)?.complete(repo_link, at);
        Ok(())
    }

    /// Sets any status. Moving backwards is allowed.
    pub fn set_topic_status(
        &mut self,
        addr: TopicAddr<'_>,
        name: &str,
        status: TopicStatus,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let topic = self.topic_mut(addr, name)?;
        topic.status = status;
        topic.last_updated = Some(at);
        Ok(())
    }

    pub fn topic(&self, addr: TopicAddr<'_>, name: &str) -> Option<&Topic> {
        self.doc
            .tracks
            .get(addr.track)?
            .topics(addr.section)?
            .iter()
            .find(|t| t.name == name)
    }

    fn track_mut(&mut self, id: &str) -> Result<&mut Track, StoreError> {
        self.doc
            .tracks
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("track '{}'", id)))
    }

    fn topics_mut(&mut self, addr: TopicAddr<'_>) -> Result<&mut Vec<Topic>, StoreError> {
        self.track_mut(addr.track)?
            .topics_mut(addr.section)
            .ok_or_else(|| StoreError::NotFound(format!("section '{}'", addr.describe())))
    }

    fn topic_mut(&mut self, addr: TopicAddr<'_>, name: &str) -> Result<&mut Topic, StoreError> {
        self.topics_mut(addr)?
            .iter_mut()
            .find(|t| t.name == name)
            .ok_or_else(|| topic_not_found(addr, name))
    }
}

fn topic_not_found(addr: TopicAddr<'_>, name: &str) -> StoreError {
    StoreError::NotFound(format!("topic '{}' in {}", name, addr.describe()))
}
