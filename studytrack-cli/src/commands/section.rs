use clap::{Args, Subcommand};
use studytrack_core::{Section, StoreError, SyncEngine};

use super::{finish, Context};

#[derive(Args)]
pub struct SectionCommand {
    #[command(subcommand)]
    pub command: SectionSubcommand,
}

#[derive(Subcommand)]
pub enum SectionSubcommand {
    /// Add a section to a track (replaces a section with the same id)
    Add {
        track: String,

        /// Section id
        id: String,

        #[arg(long)]
        title: String,
    },

    /// Delete a section and its topics
    Delete { track: String, id: String },
}

impl SectionCommand {
    pub async fn run(&self, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
        let engine = ctx.open_for_write().await?;
        println!("{}", self.apply(&engine)?);
        finish(&engine).await
    }

    fn apply(&self, engine: &SyncEngine) -> Result<String, StoreError> {
        match &self.command {
            SectionSubcommand::Add { track, id, title } => {
                engine.add_section(track, id, Section::new(title))?;
                Ok(format!("Added section {}/{}.", track, id))
            }
            SectionSubcommand::Delete { track, id } => {
                engine.delete_section(track, id)?;
                Ok(format!("Deleted section {}/{}.", track, id))
            }
        }
    }
}
