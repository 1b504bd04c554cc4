use chrono::DateTime;
use clap::Args;
use studytrack_core::{StoreError, Topic};

use super::{addr, Context};

/// Add a study session for a topic to your calendar (today, 10:00-11:00)
#[derive(Args)]
pub struct ScheduleCommand {
    track: String,

    /// Topic name
    topic: String,

    #[arg(long, short)]
    section: Option<String>,
}

impl ScheduleCommand {
    pub async fn run(&self, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
        if ctx.offline {
            return Err("Scheduling needs the server; drop --offline.".into());
        }

        let engine = ctx.open().await;
        let topic = engine
            .topic(addr(&self.track, self.section.as_deref()), &self.topic)
            .ok_or_else(|| StoreError::NotFound(format!("topic '{}'", self.topic)))?;

        let event = ctx
            .api()
            .schedule(&topic.name, event_description(&topic).as_deref())
            .await?;

        let start = event["start"]["dateTime"]
            .as_str()
            .map(format_start)
            .unwrap_or_else(|| "today".to_string());
        println!("Scheduled \"Study: {}\" for {}", topic.name, start);
        if let Some(link) = event["htmlLink"].as_str() {
            println!("{}", link);
        }
        Ok(())
    }
}

/// Formats an RFC 3339 event start for display.
fn format_start(start: &str) -> String {
    match DateTime::parse_from_rfc3339(start) {
        Ok(time) => time.format("%a %b %-d, %H:%M").to_string(),
        Err(_) => start.to_string(),
    }
}

/// Calendar event body: the topic's description and micro task.
fn event_description(topic: &Topic) -> Option<String> {
    match (&topic.description, &topic.micro_task) {
        (Some(description), Some(task)) => Some(format!("{}\n\nTask: {}", description, task)),
        (Some(description), None) => Some(description.clone()),
        (None, Some(task)) => Some(format!("Task: {}", task)),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_start() {
        assert_eq!(format_start("2025-03-14T10:00:00+01:00"), "Fri Mar 14, 10:00");
        assert_eq!(format_start("soon"), "soon");
    }

    #[test]
    fn test_event_description() {
        assert_eq!(event_description(&Topic::new("A")), None);
        assert_eq!(
            event_description(&Topic::new("A").with_description("Learn it")),
            Some("Learn it".to_string())
        );
        assert_eq!(
            event_description(
                &Topic::new("A")
                    .with_description("Learn it")
                    .with_micro_task("Build it")
            ),
            Some("Learn it\n\nTask: Build it".to_string())
        );
    }
}
