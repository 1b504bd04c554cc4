//! Study-session events in the user's primary calendar.

use chrono::{DateTime, Duration, Local, NaiveTime};
use serde::Deserialize;
use serde_json::{json, Value};

use super::error::check;
use super::{GoogleClient, GoogleError, Tokens};

/// Body of a calendar event request.
#[derive(Debug, Clone, Deserialize)]
pub struct EventRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Start and end of a study session scheduled on `now`'s day:
/// 10:00 local time, one hour long.
pub fn study_slot(now: DateTime<Local>) -> (DateTime<Local>, DateTime<Local>) {
    let ten = NaiveTime::from_hms_opt(10, 0, 0).unwrap_or_default();
    let start = now
        .date_naive()
        .and_time(ten)
        .and_local_timezone(Local)
        .earliest()
        .unwrap_or(now);
    (start, start + Duration::hours(1))
}

impl GoogleClient {
    /// Inserts a one-hour "Study: {title}" event and returns the created event.
    pub async fn create_study_event(
        &self,
        tokens: &Tokens,
        request: &EventRequest,
        now: DateTime<Local>,
    ) -> Result<Value, GoogleError> {
        let (start, end) = study_slot(now);
        let body = json!({
            "summary": format!("Study: {}", request.title),
            "description": request.description,
            "start": { "dateTime": start.to_rfc3339() },
            "end": { "dateTime": end.to_rfc3339() },
            "reminders": { "useDefault": true },
        });

        let response = self
            .http
            .post(self.api_url("/calendar/v3/calendars/primary/events"))
            .bearer_auth(&tokens.access_token)
            .json(&body)
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }
}
