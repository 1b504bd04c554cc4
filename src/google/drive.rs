//! Drive storage for the curriculum document.
//!
//! The document lives in a single JSON file with a fixed name in the user's
//! Drive. The first save creates the file together with its contents; later
//! saves overwrite the contents.

use serde::Deserialize;
use serde_json::{json, Value};

use super::error::check;
use super::{GoogleClient, GoogleError, Tokens};

/// Name of the Drive file holding the curriculum document.
pub const DATA_FILENAME: &str = "sa_study_tracker_data.json";

/// Separates the metadata and media parts of a create request. Compact JSON
/// never contains a line break, so the delimiter cannot occur in either part.
const BOUNDARY: &str = "studytrack_data_boundary";

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<FileRef>,
}

#[derive(Debug, Deserialize)]
struct FileRef {
    id: String,
}

/// `multipart/related` body carrying file metadata and contents.
fn multipart_body(metadata: &Value, doc: &Value) -> String {
    format!(
        "--{b}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{}\r\n\
         --{b}\r\nContent-Type: application/json\r\n\r\n{}\r\n--{b}--\r\n",
        metadata,
        doc,
        b = BOUNDARY
    )
}

/// Parses stored file contents. An empty file holds no document.
fn parse_document(bytes: &[u8]) -> Result<Option<Value>, GoogleError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        tracing::warn!("{} is empty; treating it as missing", DATA_FILENAME);
        return Ok(None);
    }
    serde_json::from_slice(bytes)
        .map(Some)
        .map_err(|e| GoogleError::Decode(e.to_string()))
}

impl GoogleClient {
    /// Id of the data file, if it exists.
    async fn find_data_file(&self, tokens: &Tokens) -> Result<Option<String>, GoogleError> {
        let query = format!("name = '{}'", DATA_FILENAME);
        let response = self
            .http
            .get(self.api_url("/drive/v3/files"))
            .bearer_auth(&tokens.access_token)
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id, name)"),
                ("spaces", "drive"),
            ])
            .send()
            .await?;

        let list: FileList = check(response).await?.json().await?;
        Ok(list.files.into_iter().next().map(|f| f.id))
    }

    /// Loads the stored document. `Ok(None)` when no file exists yet or the
    /// file is empty.
    pub async fn load_document(&self, tokens: &Tokens) -> Result<Option<Value>, GoogleError> {
        let Some(file_id) = self.find_data_file(tokens).await? else {
            return Ok(None);
        };

        let response = self
            .http
            .get(self.api_url(&format!("/drive/v3/files/{}", file_id)))
            .bearer_auth(&tokens.access_token)
            .query(&[("alt", "media")])
            .send()
            .await?;

        let bytes = check(response).await?.bytes().await?;
        parse_document(&bytes)
    }

    /// Overwrites the stored document, creating the file if needed.
    pub async fn save_document(&self, tokens: &Tokens, doc: &Value) -> Result<(), GoogleError> {
        let Some(file_id) = self.find_data_file(tokens).await? else {
            return self.create_data_file(tokens, doc).await;
        };

        let response = self
            .http
            .patch(self.api_url(&format!("/upload/drive/v3/files/{}", file_id)))
            .bearer_auth(&tokens.access_token)
            .query(&[("uploadType", "media")])
            .json(doc)
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }

    /// Creates the data file with `doc` as its contents in a single request.
    async fn create_data_file(&self, tokens: &Tokens, doc: &Value) -> Result<(), GoogleError> {
        tracing::info!("Creating {} in Drive", DATA_FILENAME);
        let metadata = json!({
            "name": DATA_FILENAME,
            "mimeType": "application/json",
        });
        let response = self
            .http
            .post(self.api_url("/upload/drive/v3/files"))
            .bearer_auth(&tokens.access_token)
            .query(&[("uploadType", "multipart"), ("fields", "id")])
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={}", BOUNDARY),
            )
            .body(multipart_body(&metadata, doc))
            .send()
            .await?;

        let file: FileRef = check(response).await?.json().await?;
        tracing::debug!(id = %file.id, "Created data file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_holds_no_document() {
        assert_eq!(parse_document(b"").unwrap(), None);
        assert_eq!(parse_document(b" \n").unwrap(), None);
    }

    #[test]
    fn test_parse_document() {
        let doc = parse_document(br#"{"meta": {"goal": "Architect"}}"#).unwrap();
        assert_eq!(doc, Some(json!({ "meta": { "goal": "Architect" } })));

        let err = parse_document(b"{not json").unwrap_err();
        assert!(matches!(err, GoogleError::Decode(_)));
    }

    #[test]
    fn test_multipart_body_parts() {
        let body = multipart_body(&json!({ "name": DATA_FILENAME }), &json!({ "meta": {} }));

        let parts: Vec<&str> = body
            .split(&format!("--{}", BOUNDARY))
            .filter(|p| p.contains("\r\n\r\n"))
            .collect();
        assert_eq!(parts.len(), 2);
        assert!(parts[0].contains(DATA_FILENAME));
        assert!(parts[1].trim_end().ends_with(r#"{"meta":{}}"#));
        assert!(body.ends_with(&format!("--{}--\r\n", BOUNDARY)));
    }
}
