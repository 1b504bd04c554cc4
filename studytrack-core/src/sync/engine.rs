//! Curriculum sync engine.
//!
//! Holds the session's curriculum document, reconciles it with the remote
//! store on [`SyncEngine::load`], and queues a debounced save after every
//! successful mutation.
//!
//! The document lock is never held across an `.await`. A mutation made while
//! a load is in flight can be overwritten when the load resolves; callers
//! should not mix the two.

use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::saver::{DebouncedSaver, SaveReport};
use crate::merge::{merge, MergePolicy};
use crate::models::{Curriculum, MetaPatch, Section, Topic, TopicStatus, Track, TrackPatch};
use crate::remote::{RemoteError, RemoteStore};
use crate::store::{CurriculumStore, StoreError, TopicAddr};

/// Result of a [`SyncEngine::load`] call.
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    /// A remote document existed and was applied under `policy`.
    Merged { policy: MergePolicy },
    /// Nothing was stored remotely; the local default was pushed.
    Bootstrapped { saved: bool },
    /// The remote store could not be read. Local state is unchanged.
    Unavailable(RemoteError),
    /// Another load was already running; nothing was done.
    AlreadyLoading,
}

pub struct SyncEngine {
    store: Mutex<CurriculumStore>,
    remote: Arc<dyn RemoteStore>,
    saver: DebouncedSaver,
    policy: MergePolicy,
    seed_path: Option<PathBuf>,
    loading: AtomicBool,
}

/// Clears the loading flag even if the load future is dropped early.
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl SyncEngine {
    /// Creates an engine starting from `bundled`.
    ///
    /// Spawns the save worker, so this must run inside a tokio runtime.
    pub fn new(
        remote: Arc<dyn RemoteStore>,
        bundled: Curriculum,
        policy: MergePolicy,
        debounce: Duration,
    ) -> Self {
        let saver = DebouncedSaver::spawn(Arc::clone(&remote), debounce);
        Self {
            store: Mutex::new(CurriculumStore::new(bundled)),
            remote,
            saver,
            policy,
            seed_path: None,
            loading: AtomicBool::new(false),
        }
    }

    /// Sets the fallback document read on first run.
    pub fn with_seed(mut self, path: impl Into<PathBuf>) -> Self {
        self.seed_path = Some(path.into());
        self
    }

    pub fn policy(&self) -> MergePolicy {
        self.policy
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// A copy of the current document.
    pub fn snapshot(&self) -> Curriculum {
        self.lock().document().clone()
    }

    /// Returns a copy of the topic at `addr`, if it exists.
    pub fn topic(&self, addr: TopicAddr<'_>, name: &str) -> Option<Topic> {
        self.lock().topic(addr, name).cloned()
    }

    /// Reconciles local state with the remote store.
    pub async fn load(&self) -> LoadOutcome {
        if self.loading.swap(true, Ordering::SeqCst) {
            return LoadOutcome::AlreadyLoading;
        }
        let _guard = LoadingGuard(&self.loading);

        match self.remote.fetch().await {
            Ok(Some(remote_doc)) => {
                merge(self.policy, self.lock().document_mut(), &remote_doc);
                tracing::debug!("Applied remote curriculum ({} policy)", self.policy);
                LoadOutcome::Merged {
                    policy: self.policy,
                }
            }
            Ok(None) => self.bootstrap().await,
            Err(e) => {
                tracing::warn!("Failed to sync with remote store: {}", e);
                LoadOutcome::Unavailable(e)
            }
        }
    }

    /// First run: adopt the seed document (if any) and push it immediately.
    async fn bootstrap(&self) -> LoadOutcome {
        let seed = match &self.seed_path {
            Some(path) => read_seed(path).await,
            None => None,
        };

        let snapshot = {
            let mut store = self.lock();
            if let Some(seed) = seed {
                store.replace(seed);
            }
            store.document().clone()
        };

        tracing::info!("No remote curriculum found, initializing remote store");
        let saved = match self.remote.save(&snapshot).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to initialize remote store: {}", e);
                false
            }
        };
        LoadOutcome::Bootstrapped { saved }
    }

    /// Writes any pending save now and reports on saves since the last flush.
    pub async fn flush(&self) -> SaveReport {
        self.saver.flush().await
    }

    pub fn update_meta(&self, patch: MetaPatch) {
        self.edit(|store| store.update_meta(patch));
    }

    pub fn add_track(&self, id: &str, track: Track) -> Result<(), StoreError> {
        self.mutate(|store| store.add_track(id, track))
    }

    pub fn update_track(&self, id: &str, patch: TrackPatch) -> Result<(), StoreError> {
        self.mutate(|store| store.update_track(id, patch))
    }

    pub fn delete_track(&self, id: &str) -> Result<Track, StoreError> {
        self.mutate(|store| store.delete_track(id))
    }

    pub fn add_section(
        &self,
        track_id: &str,
        section_id: &str,
        section: Section,
    ) -> Result<(), StoreError> {
        self.mutate(|store| store.add_section(track_id, section_id, section))
    }

    pub fn delete_section(&self, track_id: &str, section_id: &str) -> Result<Section, StoreError> {
        self.mutate(|store| store.delete_section(track_id, section_id))
    }

    pub fn add_topic(&self, addr: TopicAddr<'_>, topic: Topic) -> Result<(), StoreError> {
        self.mutate(|store| store.add_topic(addr, topic))
    }

    pub fn delete_topic(&self, addr: TopicAddr<'_>, name: &str) -> Result<Topic, StoreError> {
        self.mutate(|store| store.delete_topic(addr, name))
    }

    pub fn complete_topic(
        &self,
        addr: TopicAddr<'_>,
        name: &str,
        repo_link: &str,
    ) -> Result<(), StoreError> {
        self.mutate(|store| store.complete_topic(addr, name, repo_link, Utc::now()))
    }

    pub fn set_topic_status(
        &self,
        addr: TopicAddr<'_>,
        name: &str,
        status: TopicStatus,
    ) -> Result<(), StoreError> {
        self.mutate(|store| store.set_topic_status(addr, name, status, Utc::now()))
    }

    /// Applies `f` and, if it succeeds, queues a save of the new document.
    fn mutate<T>(
        &self,
        f: impl FnOnce(&mut CurriculumStore) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let (out, snapshot) = {
            let mut store = self.lock();
            let out = f(&mut store)?;
            (out, store.document().clone())
        };
        self.saver.schedule(snapshot);
        Ok(out)
    }

    fn edit(&self, f: impl FnOnce(&mut CurriculumStore)) {
        let snapshot = {
            let mut store = self.lock();
            f(&mut store);
            store.document().clone()
        };
        self.saver.schedule(snapshot);
    }

    fn lock(&self) -> MutexGuard<'_, CurriculumStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn read_seed(path: &Path) -> Option<Curriculum> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No seed document at {}", path.display());
            return None;
        }
        Err(e) => {
            tracing::warn!("Failed to read seed document {}: {}", path.display(), e);
            return None;
        }
    };

    match serde_json::from_str(&contents) {
        Ok(doc) => Some(doc),
        Err(e) => {
            tracing::warn!("Failed to parse seed document {}: {}", path.display(), e);
            None
        }
    }
}
