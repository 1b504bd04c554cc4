use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod api;
mod commands;
mod config;

use commands::{
    AuthCommand, CheckCommand, ConfigCommand, Context, MetaCommand, ScheduleCommand,
    SectionCommand, ShowCommand, TopicCommand, TrackCommand,
};
use config::Config;

#[derive(Parser)]
#[command(name = "study")]
#[command(version)]
#[command(about = "Track progress through a study curriculum", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Work on the local curriculum without contacting the server
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the curriculum and progress
    Show(ShowCommand),

    /// Edit the study plan's goal, duration and study time
    Meta(MetaCommand),

    /// Manage tracks
    Track(TrackCommand),

    /// Manage sections within a track
    Section(SectionCommand),

    /// Manage topics and their progress
    Topic(TopicCommand),

    /// Add a study session for a topic to your calendar
    Schedule(ScheduleCommand),

    /// Submit work for a topic for review
    Check(CheckCommand),

    /// Sign in and manage the server session
    Auth(AuthCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Save config path for config commands
    let cli_config_path = cli.config.clone();

    let config = Config::load(cli.config)?;

    if let Some(Commands::Config(cmd)) = &cli.command {
        return cmd.run(&config, cli_config_path);
    }

    let ctx = Context {
        config,
        offline: cli.offline,
    };

    match &cli.command {
        Some(Commands::Show(cmd)) => cmd.run(&ctx).await,
        Some(Commands::Meta(cmd)) => cmd.run(&ctx).await,
        Some(Commands::Track(cmd)) => cmd.run(&ctx).await,
        Some(Commands::Section(cmd)) => cmd.run(&ctx).await,
        Some(Commands::Topic(cmd)) => cmd.run(&ctx).await,
        Some(Commands::Schedule(cmd)) => cmd.run(&ctx).await,
        Some(Commands::Check(cmd)) => cmd.run(&ctx).await,
        Some(Commands::Auth(cmd)) => cmd.run(&ctx).await,
        Some(Commands::Config(_)) => Ok(()),
        None => {
            println!("Use --help to see available commands");
            Ok(())
        }
    }
}
