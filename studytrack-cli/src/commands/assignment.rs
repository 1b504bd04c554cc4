use clap::Args;
use studytrack_core::StoreError;

use super::{addr, finish, Context};

/// Submit a repository link for a topic; completes the topic unless the
/// review flags the link
#[derive(Args)]
pub struct CheckCommand {
    track: String,

    /// Topic name
    topic: String,

    /// Link to the work
    #[arg(long, short)]
    link: String,

    #[arg(long, short)]
    section: Option<String>,
}

impl CheckCommand {
    pub async fn run(&self, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
        let engine = ctx.open_for_write().await?;
        let topic_addr = addr(&self.track, self.section.as_deref());
        if engine.topic(topic_addr, &self.topic).is_none() {
            return Err(StoreError::NotFound(format!("topic '{}'", self.topic)).into());
        }

        let review = ctx.api().check_assignment(&self.link, &self.topic).await?;
        println!("[{}] {}", review.status, review.message);

        if review.accepted() {
            engine.complete_topic(topic_addr, &self.topic, &self.link)?;
            println!("Completed '{}'.", self.topic);
        }
        finish(&engine).await
    }
}
