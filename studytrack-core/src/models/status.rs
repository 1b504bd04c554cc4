use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Progress of a single topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TopicStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, TopicStatus::Completed)
    }
}

impl fmt::Display for TopicStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopicStatus::Pending => write!(f, "pending"),
            TopicStatus::InProgress => write!(f, "in_progress"),
            TopicStatus::Completed => write!(f, "completed"),
        }
    }
}

impl FromStr for TopicStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(TopicStatus::Pending),
            "in_progress" | "in-progress" => Ok(TopicStatus::InProgress),
            "completed" => Ok(TopicStatus::Completed),
            _ => Err(format!(
                "Invalid status '{}'. Valid options: pending, in_progress, completed",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        assert_eq!(format!("{}", TopicStatus::Pending), "pending");
        assert_eq!(format!("{}", TopicStatus::InProgress), "in_progress");
        assert_eq!(format!("{}", TopicStatus::Completed), "completed");
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!(
            TopicStatus::from_str("PENDING").unwrap(),
            TopicStatus::Pending
        );
        assert_eq!(
            TopicStatus::from_str("in-progress").unwrap(),
            TopicStatus::InProgress
        );
        assert_eq!(
            TopicStatus::from_str("Completed").unwrap(),
            TopicStatus::Completed
        );
        assert!(TopicStatus::from_str("done").is_err());
    }

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_string(&TopicStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");

        let parsed: TopicStatus = serde_json::from_str("\"completed\"").unwrap();
        assert!(parsed.is_completed());
    }
}
