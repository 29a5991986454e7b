//! Generative Language REST backend
//!
//! Issues one `generateContent` call per request. Attachments travel as
//! base64 `inlineData` parts ahead of the prompt text; prior turns become
//! earlier `contents` entries.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ModelBackend, ModelRequest, TransportError};
use crate::config::GatewayConfig;
use crate::thread::{HistoryEntry, Role};
use crate::types::Attachment;

const API_KEY_HEADER: &str = "x-goog-api-key";
const JSON_MIME: &str = "application/json";

/// Client for the Generative Language API
#[derive(Clone)]
pub struct GeminiBackend {
    http_client: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for GeminiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiBackend")
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl GeminiBackend {
    pub fn new(api_base: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::new(config.api_base.clone(), config.api_key.clone())
    }

    fn endpoint_for_model(&self, model: &str) -> String {
        let trimmed = model.trim();
        let model_path = if trimmed.starts_with("models/") {
            trimmed.to_string()
        } else {
            format!("models/{trimmed}")
        };
        format!("{}/{}:generateContent", self.api_base, model_path)
    }

    fn build_body(request: &ModelRequest) -> GenerateRequest {
        let mut contents: Vec<Content> = request.history.iter().map(Content::from).collect();

        let mut parts: Vec<Part> = request.attachments.iter().map(Part::inline).collect();
        parts.push(Part::Text {
            text: request.prompt.clone(),
        });
        contents.push(Content {
            role: Some(Role::User.as_wire()),
            parts,
        });

        let response_mime_type = request.response_schema.as_ref().map(|_| {
            request
                .tuning
                .response_mime_type
                .clone()
                .unwrap_or_else(|| JSON_MIME.to_string())
        });

        GenerateRequest {
            contents,
            system_instruction: request.system_instruction.as_ref().map(|text| Content {
                role: None,
                parts: vec![Part::Text { text: text.clone() }],
            }),
            generation_config: GenerationConfig {
                response_mime_type,
                response_schema: request.response_schema.clone(),
                thinking_config: request
                    .tuning
                    .thinking_budget
                    .map(|thinking_budget| ThinkingConfig { thinking_budget }),
                temperature: request.tuning.temperature,
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

impl From<&HistoryEntry> for Content {
    fn from(entry: &HistoryEntry) -> Self {
        Content {
            role: Some(entry.role.as_wire()),
            parts: vec![Part::Text {
                text: entry.text.clone(),
            }],
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
}

impl Part {
    fn inline(attachment: &Attachment) -> Self {
        Part::Inline {
            inline_data: InlineData {
                mime_type: attachment.mime_type.clone(),
                data: BASE64.encode(&attachment.data),
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<ThinkingConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    /// Reasoning summaries are flagged and never part of the answer
    #[serde(default)]
    thought: bool,
}

impl GenerateResponse {
    /// Answer text of the first candidate, empty when there is none
    fn into_text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter(|part| !part.thought)
                    .filter_map(|part| part.text)
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl ModelBackend for GeminiBackend {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn invoke(&self, request: ModelRequest) -> Result<String, TransportError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(TransportError::MissingApiKey)?;

        let url = self.endpoint_for_model(&request.model);
        let body = Self::build_body(&request);
        log::debug!(
            "POST {} ({} content entries, {} attachments, structured: {})",
            url,
            body.contents.len(),
            request.attachments.len(),
            request.response_schema.is_some()
        );

        let response = self
            .http_client
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .await
            .map_err(TransportError::Http)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(TransportError::Unauthorized(status.as_u16()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|e| {
                log::debug!("Failed to read error body for status {}: {}", status, e);
                String::new()
            });
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await.map_err(TransportError::Http)?;
        let parsed: GenerateResponse = serde_json::from_str(&text)
            .map_err(|e| TransportError::InvalidBody(e.to_string()))?;
        Ok(parsed.into_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelTuning;
    use mockito::Matcher;
    use serde_json::json;
    use std::io::Write;

    fn reply(text: &str) -> String {
        json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }]
        })
        .to_string()
    }

    #[test]
    fn test_endpoint_for_model() {
        let backend = GeminiBackend::new("https://example.test/v1beta/", None);
        assert_eq!(
            backend.endpoint_for_model("gemini-2.5-flash"),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(
            backend.endpoint_for_model("models/custom"),
            "https://example.test/v1beta/models/custom:generateContent"
        );
    }

    #[test]
    fn test_body_orders_history_then_attachment_then_text() {
        let request = ModelRequest {
            model: "m".into(),
            prompt: "Analyze".into(),
            attachments: vec![Attachment::new("image/png", vec![1, 2, 3])],
            response_schema: Some(json!({ "type": "OBJECT" })),
            system_instruction: Some("Be brief".into()),
            history: vec![HistoryEntry {
                role: Role::Assistant,
                text: "Hi".into(),
            }],
            tuning: ModelTuning::with_thinking_budget(1024),
        };
        let body = serde_json::to_value(GeminiBackend::build_body(&request)).unwrap();
        assert_eq!(
            body,
            json!({
                "contents": [
                    { "role": "model", "parts": [{ "text": "Hi" }] },
                    { "role": "user", "parts": [
                        { "inlineData": { "mimeType": "image/png", "data": "AQID" } },
                        { "text": "Analyze" }
                    ]}
                ],
                "systemInstruction": { "parts": [{ "text": "Be brief" }] },
                "generationConfig": {
                    "responseMimeType": "application/json",
                    "responseSchema": { "type": "OBJECT" },
                    "thinkingConfig": { "thinkingBudget": 1024 }
                }
            })
        );
    }

    #[test]
    fn test_free_text_request_has_no_mime_type() {
        let request = ModelRequest {
            model: "m".into(),
            prompt: "Hello".into(),
            ..ModelRequest::default()
        };
        let body = serde_json::to_value(GeminiBackend::build_body(&request)).unwrap();
        assert_eq!(body["generationConfig"], json!({}));
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn test_reply_skips_thought_parts() {
        let parsed: GenerateResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [
                { "text": "thinking...", "thought": true },
                { "text": "[1," },
                { "text": "2]" }
            ]}}]
        }))
        .unwrap();
        assert_eq!(parsed.into_text(), "[1,2]");
        assert_eq!(GenerateResponse::default().into_text(), "");
    }

    #[tokio::test]
    async fn test_invoke_returns_reply_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-2.5-flash:generateContent")
            .match_header("x-goog-api-key", "test-key")
            .match_body(Matcher::PartialJson(json!({
                "contents": [{ "role": "user", "parts": [{ "text": "Hello" }] }]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(reply("Hi there"))
            .create_async()
            .await;

        let backend = GeminiBackend::new(server.url(), Some("test-key".into()));
        let request = ModelRequest {
            model: "gemini-2.5-flash".into(),
            prompt: "Hello".into(),
            ..ModelRequest::default()
        };
        let text = backend.invoke(request).await.unwrap();

        assert_eq!(text, "Hi there");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_invoke_maps_auth_rejection() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", Matcher::Any)
            .with_status(403)
            .with_body("forbidden")
            .create_async()
            .await;

        let backend = GeminiBackend::new(server.url(), Some("bad-key".into()));
        let err = backend
            .invoke(ModelRequest {
                model: "m".into(),
                ..ModelRequest::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Unauthorized(403)));
    }

    #[tokio::test]
    async fn test_invoke_maps_server_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", Matcher::Any)
            .with_status(503)
            .with_body("overloaded")
            .create_async()
            .await;

        let backend = GeminiBackend::new(server.url(), Some("key".into()));
        let err = backend
            .invoke(ModelRequest {
                model: "m".into(),
                ..ModelRequest::default()
            })
            .await
            .unwrap_err();
        match err {
            TransportError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "overloaded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_truncated_error_body_still_maps_status() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", Matcher::Any)
            .with_status(502)
            .with_chunked_body(|w| {
                w.write_all(b"bad gat")?;
                Err(std::io::Error::other("connection dropped"))
            })
            .create_async()
            .await;

        let backend = GeminiBackend::new(server.url(), Some("key".into()));
        let err = backend
            .invoke(ModelRequest {
                model: "m".into(),
                ..ModelRequest::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Status { status: 502, .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_invoke_without_key_makes_no_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let backend = GeminiBackend::new(server.url(), Some("  ".into()));
        let err = backend.invoke(ModelRequest::default()).await.unwrap_err();
        assert!(matches!(err, TransportError::MissingApiKey));
        mock.assert_async().await;
    }
}
