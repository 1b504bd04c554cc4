//! StudyTrack server.
//!
//! Keeps the user's Google session and stores the curriculum document in
//! Drive on behalf of StudyTrack clients.

pub mod google;
pub mod server;
