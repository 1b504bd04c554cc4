use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::status::TopicStatus;

/// Kind of reference material attached to a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Video,
    Article,
    Doc,
}

/// A piece of reference material (video, article, documentation page).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub label: String,
    pub url: String,
}

impl Resource {
    pub fn new(kind: ResourceKind, label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            url: url.into(),
        }
    }
}

/// Atomic unit of study.
///
/// `name` identifies the topic within its track or section. `status`,
/// `repo_link` and `last_updated` are the progress fields; everything else
/// belongs to the curriculum definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Estimated hours of study.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<f32>,
    /// How often the topic comes up in interviews (1-5).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub micro_task: Option<String>,
    #[serde(default)]
    pub status: TopicStatus,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Topic {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            hours: None,
            frequency: None,
            micro_task: None,
            status: TopicStatus::Pending,
            resources: Vec::new(),
            repo_link: None,
            last_updated: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_hours(mut self, hours: f32) -> Self {
        self.hours = Some(hours);
        self
    }

    pub fn with_frequency(mut self, frequency: u8) -> Self {
        self.frequency = Some(frequency);
        self
    }

    pub fn with_micro_task(mut self, task: impl Into<String>) -> Self {
        self.micro_task = Some(task.into());
        self
    }

    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resources.push(resource);
        self
    }

    /// Marks the topic completed with a link to the supporting work.
    pub fn complete(&mut self, repo_link: impl Into<String>, at: DateTime<Utc>) {
        self.status = TopicStatus::Completed;
        self.repo_link = Some(repo_link.into());
        self.last_updated = Some(at);
    }

    /// Copies the progress fields from `other`, leaving the definition alone.
    pub fn adopt_progress(&mut self, other: &Topic) {
        self.status = other.status;
        self.repo_link = other.repo_link.clone();
        self.last_updated = other.last_updated;
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = match self.status {
            TopicStatus::Completed => "[x]",
            TopicStatus::InProgress => "[~]",
            TopicStatus::Pending => "[ ]",
        };
        write!(f, "{} {}", mark, self.name)?;
        if let Some(hours) = self.hours {
            write!(f, " ({}h)", hours)?;
        }
        if let Some(link) = &self.repo_link {
            write!(f, " -> {}", link)?;
        }
        Ok(())
    }
}
