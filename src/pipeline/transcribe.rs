//! The transcription service boundary.
//!
//! Everything past this seam is opaque to the pipeline: an enhanced page
//! image goes in, structured text (or a failure) comes out. The
//! [`Transcriber`] trait keeps the orchestrator testable — integration
//! tests inject a stub and never touch the network — while
//! [`GeminiTranscriber`] is the production implementation.
//!
//! There is deliberately no retry or backoff here: a failed call is
//! captured as error-marker page content by the orchestrator and the run
//! moves on. Rate limiting is handled by the orchestrator's fixed
//! inter-page delay instead.

use crate::content::PageContent;
use crate::error::TranscribeError;
use crate::prompts::TRANSCRIPTION_PROMPT;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Converts one page image into structured text.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe a single enhanced page image.
    async fn transcribe(&self, image: &Path) -> Result<PageContent, TranscribeError>;
}

/// Production transcriber backed by the Gemini `generateContent` API.
///
/// The image travels inline as base64 and the request pins the response
/// MIME type to JSON, so the model is contractually bound to return a
/// `{"latex": ..., "markdown": ...}` object.
pub struct GeminiTranscriber {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

impl GeminiTranscriber {
    /// Build a transcriber for `model` with the given per-call timeout.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, TranscribeError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
        })
    }
}

#[async_trait]
impl Transcriber for GeminiTranscriber {
    async fn transcribe(&self, image: &Path) -> Result<PageContent, TranscribeError> {
        let bytes = std::fs::read(image).map_err(|e| TranscribeError::ImageRead {
            path: image.to_path_buf(),
            source: e,
        })?;
        let b64 = STANDARD.encode(&bytes);
        debug!(
            "Transcribing '{}' ({} bytes inline)",
            image.display(),
            b64.len()
        );

        let body = serde_json::json!({
            "contents": [{
                "parts": [
                    { "inline_data": { "mime_type": mime_type_for(image), "data": b64 } },
                    { "text": TRANSCRIPTION_PROMPT }
                ]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "temperature": 0.1
            }
        });

        let url = format!("{API_BASE}/{}:generateContent", self.model);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranscribeError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let reply: GenerateContentResponse = response.json().await?;
        parse_reply(reply)
    }
}

/// MIME type for the inline upload, from the file extension.
fn mime_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("pdf") => "application/pdf",
        _ => "image/png",
    }
}

/// Dig the transcript JSON out of the API reply.
fn parse_reply(reply: GenerateContentResponse) -> Result<PageContent, TranscribeError> {
    let text = reply
        .candidates
        .into_iter()
        .flatten()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts)
        .into_iter()
        .flatten()
        .find_map(|p| p.text)
        .ok_or_else(|| TranscribeError::UnparsableResponse {
            detail: "reply carried no text part".into(),
        })?;

    let transcript: Transcript =
        serde_json::from_str(&text).map_err(|e| TranscribeError::UnparsableResponse {
            detail: format!("reply text is not a latex/markdown object: {e}"),
        })?;

    Ok(PageContent::Structured {
        latex: transcript.latex,
        markdown: transcript.markdown,
    })
}

#[derive(Debug, Deserialize)]
struct Transcript {
    latex: String,
    markdown: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<Part>>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply_with_text(text: &str) -> GenerateContentResponse {
        GenerateContentResponse {
            candidates: Some(vec![Candidate {
                content: Some(CandidateContent {
                    parts: Some(vec![Part {
                        text: Some(text.to_string()),
                    }]),
                }),
            }]),
        }
    }

    #[test]
    fn mime_types_cover_the_accepted_extensions() {
        assert_eq!(mime_type_for(Path::new("a.png")), "image/png");
        assert_eq!(mime_type_for(Path::new("a.JPG")), "image/jpeg");
        assert_eq!(mime_type_for(Path::new("a.jpeg")), "image/jpeg");
        assert_eq!(mime_type_for(Path::new("a.webp")), "image/webp");
        assert_eq!(mime_type_for(Path::new("a.pdf")), "application/pdf");
    }

    #[test]
    fn well_formed_reply_parses() {
        let reply = reply_with_text(r#"{"latex": "x^2", "markdown": "$x^2$"}"#);
        assert_eq!(
            parse_reply(reply).unwrap(),
            PageContent::Structured {
                latex: "x^2".into(),
                markdown: "$x^2$".into(),
            }
        );
    }

    #[test]
    fn non_json_reply_text_is_unparsable() {
        let reply = reply_with_text("Sure! Here is the transcription:");
        assert!(matches!(
            parse_reply(reply),
            Err(TranscribeError::UnparsableResponse { .. })
        ));
    }

    #[test]
    fn empty_reply_is_unparsable() {
        let reply = GenerateContentResponse { candidates: None };
        assert!(matches!(
            parse_reply(reply),
            Err(TranscribeError::UnparsableResponse { .. })
        ));
    }
}
