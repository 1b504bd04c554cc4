use clap::{Args, Subcommand};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use super::OutputFormat;
use crate::config::Config;

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Initialize configuration file
    Init,
}

const DEFAULT_CONFIG: &str = r#"# studytrack configuration

# StudyTrack server
server_url: http://localhost:3008

# How saved progress is applied on load: structural (keep the local
# curriculum, take progress from the server) or replace
merge_policy: structural

# Quiet period in milliseconds before a change is saved
debounce_ms: 1000

# Curriculum to start from when nothing is saved yet (JSON)
# seed_path: curriculum.json

# Session cookie value; set with 'study auth set-session'
# session: ...
"#;

impl ConfigCommand {
    pub fn run(
        &self,
        config: &Config,
        cli_config_path: Option<PathBuf>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        if let Some(path) = &config.config_file {
                            println!("Config file: {}", path.display());
                        } else {
                            println!(
                                "Config file: {} (not found)",
                                cli_config_path
                                    .unwrap_or_else(Config::default_config_path)
                                    .display()
                            );
                        }
                        println!();

                        println!("server_url: {}", config.server_url.value);
                        println!("  source: {}", config.server_url.source);
                        println!();

                        let session = match &config.session.value {
                            Some(value) => mask(value),
                            None => "(not set)".to_string(),
                        };
                        println!("session: {}", session);
                        println!("  source: {}", config.session.source);
                        println!();

                        println!("merge_policy: {}", config.merge_policy.value);
                        println!("  source: {}", config.merge_policy.source);
                        println!();

                        println!("debounce_ms: {}", config.debounce_ms.value);
                        println!("  source: {}", config.debounce_ms.source);
                        println!();

                        let seed = match &config.seed_path.value {
                            Some(path) => path.display().to_string(),
                            None => "(bundled curriculum)".to_string(),
                        };
                        println!("seed_path: {}", seed);
                        println!("  source: {}", config.seed_path.source);
                    }
                }
                Ok(())
            }

            ConfigSubcommand::Init => {
                let config_path = cli_config_path.unwrap_or_else(Config::default_config_path);

                if config_path.exists() {
                    println!("Config file already exists: {}", config_path.display());
                    println!("Use 'study config show' to view current configuration.");
                    return Ok(());
                }

                if let Some(parent) = config_path.parent() {
                    fs::create_dir_all(parent)?;
                }

                let mut file = fs::File::create(&config_path)?;
                file.write_all(DEFAULT_CONFIG.as_bytes())?;

                println!("Created config file: {}", config_path.display());
                println!("\nEdit this file to customize your settings.");
                Ok(())
            }
        }
    }
}

/// Shortens a secret for display.
fn mask(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        "****".to_string()
    }
}
