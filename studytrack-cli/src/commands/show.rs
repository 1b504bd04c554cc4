use clap::Args;
use studytrack_core::{Curriculum, Meta, StoreError};

use super::{Context, OutputFormat};

/// Show the curriculum and progress
#[derive(Args)]
pub struct ShowCommand {
    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Show a single track
    #[arg(long, short)]
    track: Option<String>,
}

impl ShowCommand {
    pub async fn run(&self, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
        let engine = ctx.open().await;
        let doc = engine.snapshot();
        println!("{}", render(&doc, self.track.as_deref(), &self.format)?);
        Ok(())
    }
}

fn render(
    doc: &Curriculum,
    track_id: Option<&str>,
    format: &OutputFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    let view = match track_id {
        Some(id) => {
            let track = doc
                .track(id)
                .ok_or_else(|| StoreError::NotFound(format!("track '{}'", id)))?;
            Curriculum::new(Meta::default()).with_track(id, track.clone())
        }
        None => doc.clone(),
    };

    match format {
        OutputFormat::Json => match track_id {
            Some(id) => Ok(serde_json::to_string_pretty(&view.tracks[id])?),
            None => Ok(serde_json::to_string_pretty(&view)?),
        },
        OutputFormat::Text => {
            let (done, total) = view.progress();
            Ok(format!(
                "{}\nProgress: {}/{} topics completed",
                view.to_string().trim_end(),
                done,
                total
            ))
        }
    }
}
