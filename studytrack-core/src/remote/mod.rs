//! Remote store adapters.
//!
//! The remote store is the system of record: it holds one whole curriculum
//! document under a fixed name. Saves overwrite the whole document.

mod http;
mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::Curriculum;

pub use http::{HttpRemoteStore, SESSION_COOKIE};
pub use memory::MemoryRemoteStore;

#[derive(Error, Debug, Clone)]
pub enum RemoteError {
    #[error("Not logged in")]
    Unauthorized,

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Server returned {0}: {1}")]
    Status(u16, String),

    #[error("Malformed document: {0}")]
    Decode(String),

    #[error("Remote store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetches the stored document. `Ok(None)` means nothing has been saved yet.
    async fn fetch(&self) -> Result<Option<Curriculum>, RemoteError>;

    /// Replaces the stored document with `doc`.
    async fn save(&self, doc: &Curriculum) -> Result<(), RemoteError>;
}
