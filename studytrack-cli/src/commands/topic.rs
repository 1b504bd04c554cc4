use clap::{Args, Subcommand};
use studytrack_core::{StoreError, SyncEngine, Topic, TopicStatus};

use super::{addr, finish, Context};

#[derive(Args)]
pub struct TopicCommand {
    #[command(subcommand)]
    pub command: TopicSubcommand,
}

#[derive(Subcommand)]
pub enum TopicSubcommand {
    /// Add a topic (replaces a topic with the same name in place)
    Add {
        track: String,

        /// Topic name
        name: String,

        /// Add to a section instead of the track's own list
        #[arg(long, short)]
        section: Option<String>,

        #[arg(long, short)]
        description: Option<String>,

        /// Estimated hours
        #[arg(long)]
        hours: Option<f32>,

        /// How often the topic comes up in interviews (1-5)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        frequency: Option<u8>,

        /// Small practical task
        #[arg(long)]
        micro_task: Option<String>,
    },

    /// Delete a topic
    Delete {
        track: String,
        name: String,

        #[arg(long, short)]
        section: Option<String>,
    },

    /// Mark a topic completed with a link to the work
    Complete {
        track: String,
        name: String,

        /// Repository or other link to the completed work
        #[arg(long, short)]
        link: String,

        #[arg(long, short)]
        section: Option<String>,
    },

    /// Set a topic's status (pending, in_progress, completed)
    Status {
        track: String,
        name: String,
        status: TopicStatus,

        #[arg(long, short)]
        section: Option<String>,
    },
}

impl TopicCommand {
    pub async fn run(&self, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
        let engine = ctx.open_for_write().await?;
        println!("{}", self.apply(&engine)?);
        finish(&engine).await
    }

    fn apply(&self, engine: &SyncEngine) -> Result<String, StoreError> {
        match &self.command {
            TopicSubcommand::Add {
                track,
                name,
                section,
                description,
                hours,
                frequency,
                micro_task,
            } => {
                let mut topic = Topic::new(name);
                topic.description = description.clone();
                topic.hours = *hours;
                topic.frequency = *frequency;
                topic.micro_task = micro_task.clone();
                engine.add_topic(addr(track, section.as_deref()), topic)?;
                Ok(format!("Added topic '{}'.", name))
            }
            TopicSubcommand::Delete {
                track,
                name,
                section,
            } => {
                engine.delete_topic(addr(track, section.as_deref()), name)?;
                Ok(format!("Deleted topic '{}'.", name))
            }
            TopicSubcommand::Complete {
                track,
                name,
                link,
                section,
            } => {
                engine.complete_topic(addr(track, section.as_deref()), name, link)?;
                Ok(format!("Completed '{}'.", name))
            }
            TopicSubcommand::Status {
                track,
                name,
                status,
                section,
            } => {
                engine.set_topic_status(addr(track, section.as_deref()), name, *status)?;
                Ok(format!("Marked '{}' {}.", name, status))
            }
        }
    }
}
