mod assignment;
mod auth;
mod config_cmd;
mod meta;
mod schedule;
mod section;
mod show;
mod topic;
mod track;

pub use assignment::CheckCommand;
pub use auth::AuthCommand;
pub use config_cmd::ConfigCommand;
pub use meta::MetaCommand;
pub use schedule::ScheduleCommand;
pub use section::SectionCommand;
pub use show::ShowCommand;
pub use topic::TopicCommand;
pub use track::TrackCommand;

use clap::ValueEnum;
use std::sync::Arc;
use std::time::Duration;
use studytrack_core::{
    Curriculum, HttpRemoteStore, LoadOutcome, MemoryRemoteStore, RemoteError, RemoteStore,
    SaveReport, SyncEngine, TopicAddr,
};

use crate::api::ApiClient;
use crate::config::Config;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Where commands read and write the curriculum.
pub struct Context {
    pub config: Config,
    pub offline: bool,
}

impl Context {
    fn remote(&self) -> Arc<dyn RemoteStore> {
        if self.offline {
            Arc::new(MemoryRemoteStore::new())
        } else {
            Arc::new(HttpRemoteStore::new(
                self.config.server_url.value.clone(),
                self.config.session.value.clone(),
            ))
        }
    }

    pub fn api(&self) -> ApiClient {
        ApiClient::new(
            &self.config.server_url.value,
            self.config.session.value.clone(),
        )
    }

    fn engine(&self) -> SyncEngine {
        let engine = SyncEngine::new(
            self.remote(),
            Curriculum::bundled(),
            self.config.merge_policy.value,
            Duration::from_millis(self.config.debounce_ms.value),
        );
        match &self.config.seed_path.value {
            Some(path) => engine.with_seed(path),
            None => engine,
        }
    }

    /// Engine loaded for reading. An unreachable remote store is reported
    /// and the local curriculum is used instead.
    pub async fn open(&self) -> SyncEngine {
        let engine = self.engine();
        let outcome = engine.load().await;
        if let Some(notice) = load_notice(&outcome, self.offline) {
            eprintln!("{}", notice);
        }
        engine
    }

    /// Engine loaded for a change. Fails when the remote store could not be
    /// read, since saving over it from the local default would lose progress.
    pub async fn open_for_write(&self) -> Result<SyncEngine, Box<dyn std::error::Error>> {
        let engine = self.engine();
        let outcome = engine.load().await;
        if let LoadOutcome::Unavailable(e) = outcome {
            return Err(e.into());
        }
        if let Some(notice) = load_notice(&outcome, self.offline) {
            eprintln!("{}", notice);
        }
        Ok(engine)
    }
}

fn load_notice(outcome: &LoadOutcome, offline: bool) -> Option<String> {
    match outcome {
        _ if offline => Some("Offline: changes will not be saved.".to_string()),
        LoadOutcome::Unavailable(RemoteError::Unauthorized) => Some(
            "Not logged in; showing the local curriculum. Run 'study auth login' to sync."
                .to_string(),
        ),
        LoadOutcome::Unavailable(e) => Some(format!(
            "Could not reach the remote store ({}); showing the local curriculum.",
            e
        )),
        LoadOutcome::Bootstrapped { saved: true } => {
            Some("No saved curriculum found; initialized it from the default.".to_string())
        }
        LoadOutcome::Bootstrapped { saved: false } => {
            Some("No saved curriculum found, and initializing it failed.".to_string())
        }
        LoadOutcome::Merged { .. } | LoadOutcome::AlreadyLoading => None,
    }
}

/// Writes pending changes and reports on them.
pub async fn finish(engine: &SyncEngine) -> Result<(), Box<dyn std::error::Error>> {
    let report = engine.flush().await;
    match describe_report(&report) {
        Ok(Some(line)) => {
            println!("{}", line);
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(line) => Err(line.into()),
    }
}

fn describe_report(report: &SaveReport) -> Result<Option<String>, String> {
    if !report.is_clean() {
        return Err(format!(
            "Saving failed ({} of {} attempts): {}",
            report.failures.len(),
            report.attempted,
            report.failures.join("; ")
        ));
    }
    if report.succeeded > 0 {
        return Ok(Some("Saved.".to_string()));
    }
    Ok(None)
}

/// Address of a topic given on the command line.
fn addr<'a>(track: &'a str, section: Option<&'a str>) -> TopicAddr<'a> {
    match section {
        Some(section) => TopicAddr::section(track, section),
        None => TopicAddr::track(track),
    }
}
