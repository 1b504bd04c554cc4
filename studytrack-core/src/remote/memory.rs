use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use super::{RemoteError, RemoteStore};
use crate::models::Curriculum;

/// In-process remote store.
///
/// Keeps the stored document in memory and records every save payload.
/// Fetches and saves can be made to fail for exercising error paths.
#[derive(Debug, Default)]
pub struct MemoryRemoteStore {
    stored: Mutex<Option<Curriculum>>,
    saves: Mutex<Vec<Curriculum>>,
    fail_fetch: AtomicBool,
    fail_save: AtomicBool,
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(doc: Curriculum) -> Self {
        Self {
            stored: Mutex::new(Some(doc)),
            ..Self::default()
        }
    }

    pub fn set_fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_save(&self, fail: bool) {
        self.fail_save.store(fail, Ordering::SeqCst);
    }

    /// The currently stored document.
    pub fn stored(&self) -> Option<Curriculum> {
        self.stored
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Every payload passed to `save`, including failed attempts.
    pub fn saves(&self) -> Vec<Curriculum> {
        self.saves
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn fetch(&self) -> Result<Option<Curriculum>, RemoteError> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable("fetch disabled".to_string()));
        }
        Ok(self.stored())
    }

    async fn save(&self, doc: &Curriculum) -> Result<(), RemoteError> {
        self.saves
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(doc.clone());

        if self.fail_save.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable("save disabled".to_string()));
        }
        *self.stored.lock().unwrap_or_else(PoisonError::into_inner) = Some(doc.clone());
        Ok(())
    }
}
