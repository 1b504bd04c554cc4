use clap::{Args, Subcommand};
use studytrack_core::{StoreError, SyncEngine, Track, TrackPatch};

use super::{finish, Context};

#[derive(Args)]
pub struct TrackCommand {
    #[command(subcommand)]
    pub command: TrackSubcommand,
}

#[derive(Subcommand)]
pub enum TrackSubcommand {
    /// Add a track (replaces an existing track with the same id)
    Add {
        /// Track id (e.g. LLD)
        id: String,

        #[arg(long)]
        title: String,

        /// Planned duration (e.g. "6 weeks")
        #[arg(long)]
        duration: Option<String>,
    },

    /// Update a track's title or duration
    Update {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        duration: Option<String>,
    },

    /// Delete a track and all of its topics
    Delete { id: String },
}

impl TrackCommand {
    pub async fn run(&self, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
        let engine = ctx.open_for_write().await?;
        println!("{}", self.apply(&engine)?);
        finish(&engine).await
    }

    fn apply(&self, engine: &SyncEngine) -> Result<String, StoreError> {
        match &self.command {
            TrackSubcommand::Add {
                id,
                title,
                duration,
            } => {
                let mut track = Track::new(title);
                track.duration = duration.clone();
                engine.add_track(id, track)?;
                Ok(format!("Added track {}.", id))
            }
            TrackSubcommand::Update {
                id,
                title,
                duration,
            } => {
                engine.update_track(
                    id,
                    TrackPatch {
                        title: title.clone(),
                        duration: duration.clone(),
                    },
                )?;
                Ok(format!("Updated track {}.", id))
            }
            TrackSubcommand::Delete { id } => {
                let track = engine.delete_track(id)?;
                Ok(format!(
                    "Deleted track {} ({} topics).",
                    id,
                    track.all_topics().count()
                ))
            }
        }
    }
}
