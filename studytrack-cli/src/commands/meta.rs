use clap::{Args, Subcommand};
use studytrack_core::{MetaPatch, SyncEngine};

use super::{finish, Context};

#[derive(Args)]
pub struct MetaCommand {
    #[command(subcommand)]
    pub command: MetaSubcommand,
}

#[derive(Subcommand)]
pub enum MetaSubcommand {
    /// Update the study plan's goal, duration or daily study time
    Set {
        #[arg(long)]
        goal: Option<String>,

        #[arg(long)]
        duration: Option<String>,

        #[arg(long)]
        study_time: Option<String>,
    },
}

impl MetaCommand {
    pub async fn run(&self, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
        let engine = ctx.open_for_write().await?;
        println!("{}", self.apply(&engine)?);
        finish(&engine).await
    }

    fn apply(&self, engine: &SyncEngine) -> Result<String, Box<dyn std::error::Error>> {
        match &self.command {
            MetaSubcommand::Set {
                goal,
                duration,
                study_time,
            } => {
                if goal.is_none() && duration.is_none() && study_time.is_none() {
                    return Err("Nothing to update. Use --goal, --duration or --study-time.".into());
                }
                engine.update_meta(MetaPatch {
                    goal: goal.clone(),
                    duration: duration.clone(),
                    study_time: study_time.clone(),
                });
                Ok("Updated study plan.".to_string())
            }
        }
    }
}
