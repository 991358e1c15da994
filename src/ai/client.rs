use crate::config::Config;
use crate::error::ServiceError;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::fmt;

pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";

/// Image bytes sent inline with a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    /// Bare base64, no data-URI header.
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text(String),
    InlineImage(InlineImage),
}

/// The parts of the first candidate the service returned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentResponse {
    pub parts: Vec<ContentPart>,
}

impl ContentResponse {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![ContentPart::Text(text.into())],
        }
    }

    pub fn from_inline_image(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            parts: vec![ContentPart::InlineImage(InlineImage {
                mime_type: mime_type.into(),
                data: data.into(),
            })],
        }
    }

    /// First inline image part, if any.
    pub fn first_inline_image(&self) -> Option<&InlineImage> {
        self.parts.iter().find_map(|part| match part {
            ContentPart::InlineImage(image) => Some(image),
            ContentPart::Text(_) => None,
        })
    }

    /// All text parts joined by newlines, `None` when there are none.
    pub fn text(&self) -> Option<String> {
        let texts: Vec<&str> = self
            .parts
            .iter()
            .filter_map(|part| match part {
                ContentPart::Text(text) => Some(text.as_str()),
                ContentPart::InlineImage(_) => None,
            })
            .collect();
        if texts.is_empty() {
            None
        } else {
            Some(texts.join("\n"))
        }
    }
}

/// The generative AI service the quiz orchestrator is a client of.
#[async_trait]
pub trait GenerativeService: Send + Sync {
    /// Produces an illustration from a prompt and an optional sketch.
    async fn generate_image(
        &self,
        prompt: &str,
        sketch: Option<&InlineImage>,
    ) -> Result<ContentResponse, ServiceError>;

    /// Produces JSON text conforming to `schema`.
    async fn generate_structured(
        &self,
        prompt: &str,
        schema: &Value,
    ) -> Result<ContentResponse, ServiceError>;
}

/// Client for the Generative Language `generateContent` REST endpoint.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    image_model: String,
    text_model: String,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("image_model", &self.image_model)
            .field("text_model", &self.text_model)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self, ServiceError> {
        Self::with_api_key(config, config.resolve_api_key())
    }

    pub fn with_api_key(config: &Config, api_key: Option<String>) -> Result<Self, ServiceError> {
        let api_key = api_key.ok_or(ServiceError::MissingApiKey)?;
        let http = reqwest::Client::builder().build()?;

        Ok(Self {
            http,
            api_key,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            image_model: config.image_model.clone(),
            text_model: config.text_model.clone(),
        })
    }

    async fn generate_content(
        &self,
        model: &str,
        body: Value,
    ) -> Result<ContentResponse, ServiceError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        tracing::debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))?;

        Ok(payload.into_content())
    }
}

#[async_trait]
impl GenerativeService for GeminiClient {
    async fn generate_image(
        &self,
        prompt: &str,
        sketch: Option<&InlineImage>,
    ) -> Result<ContentResponse, ServiceError> {
        let mut parts = Vec::new();
        if let Some(sketch) = sketch {
            parts.push(json!({
                "inlineData": { "mimeType": sketch.mime_type, "data": sketch.data }
            }));
        }
        parts.push(json!({ "text": prompt }));

        let body = json!({
            "contents": [{ "parts": parts }],
            "generationConfig": { "responseModalities": ["TEXT", "IMAGE"] }
        });

        self.generate_content(&self.image_model, body).await
    }

    async fn generate_structured(
        &self,
        prompt: &str,
        schema: &Value,
    ) -> Result<ContentResponse, ServiceError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema
            }
        });

        self.generate_content(&self.text_model, body).await
    }
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
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
    parts: Vec<WirePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<WireBlob>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireBlob {
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    data: String,
}

impl GenerateContentResponse {
    fn into_content(self) -> ContentResponse {
        let parts = self
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|part| {
                if let Some(blob) = part.inline_data {
                    Some(ContentPart::InlineImage(InlineImage {
                        mime_type: blob
                            .mime_type
                            .unwrap_or_else(|| crate::image_data::DEFAULT_MIME_TYPE.to_string()),
                        data: blob.data,
                    }))
                } else {
                    part.text.map(ContentPart::Text)
                }
            })
            .collect();

        ContentResponse { parts }
    }
}

#[cfg(test)]
use std::sync::Mutex;

/// A call recorded by [`MockService`].
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Image {
        prompt: String,
        sketch: Option<InlineImage>,
    },
    Structured {
        prompt: String,
    },
}

/// Recording test double for [`GenerativeService`].
#[cfg(test)]
pub struct MockService {
    image_response: Result<ContentResponse, String>,
    structured_response: Result<ContentResponse, String>,
    calls: Mutex<Vec<MockCall>>,
}

#[cfg(test)]
impl MockService {
    pub fn new(image_response: ContentResponse, structured_response: ContentResponse) -> Self {
        Self {
            image_response: Ok(image_response),
            structured_response: Ok(structured_response),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Image calls return a small PNG; structured calls echo `original`/`blanked`.
    pub fn with_sentences(original: &str, blanked: &str) -> Self {
        Self::new(
            ContentResponse::from_inline_image("image/png", "iVBORw0KGgo="),
            ContentResponse::from_text(
                json!({ "originalSentence": original, "blankedSentence": blanked }).to_string(),
            ),
        )
    }

    pub fn failing_image(mut self, message: &str) -> Self {
        self.image_response = Err(message.to_string());
        self
    }

    pub fn failing_structured(mut self, message: &str) -> Self {
        self.structured_response = Err(message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn image_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, MockCall::Image { .. }))
            .count()
    }

    pub fn structured_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, MockCall::Structured { .. }))
            .count()
    }
}

#[cfg(test)]
#[async_trait]
impl GenerativeService for MockService {
    async fn generate_image(
        &self,
        prompt: &str,
        sketch: Option<&InlineImage>,
    ) -> Result<ContentResponse, ServiceError> {
        self.calls.lock().unwrap().push(MockCall::Image {
            prompt: prompt.to_string(),
            sketch: sketch.cloned(),
        });
        self.image_response.clone().map_err(ServiceError::Decode)
    }

    async fn generate_structured(
        &self,
        prompt: &str,
        _schema: &Value,
    ) -> Result<ContentResponse, ServiceError> {
        self.calls.lock().unwrap().push(MockCall::Structured {
            prompt: prompt.to_string(),
        });
        self.structured_response.clone().map_err(ServiceError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_image_response() {
        let raw = r#"{
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "Here is your illustration." },
                        { "inlineData": { "mimeType": "image/png", "data": "QUJD" } },
                        { "inlineData": { "mimeType": "image/jpeg", "data": "REVG" } }
                    ]
                }
            }]
        }"#;
        let parsed: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        let content = parsed.into_content();

        assert_eq!(content.parts.len(), 3);
        let image = content.first_inline_image().unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.data, "QUJD");
        assert_eq!(content.text().as_deref(), Some("Here is your illustration."));
    }

    #[test]
    fn test_parse_empty_response() {
        let parsed: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        let content = parsed.into_content();
        assert!(content.parts.is_empty());
        assert!(content.first_inline_image().is_none());
        assert!(content.text().is_none());
    }

    #[test]
    fn test_parse_candidate_without_content() {
        let parsed: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap();
        assert!(parsed.into_content().parts.is_empty());
    }

    #[test]
    fn test_text_joins_parts() {
        let content = ContentResponse {
            parts: vec![
                ContentPart::Text("{\"a\":".to_string()),
                ContentPart::Text("1}".to_string()),
            ],
        };
        assert_eq!(content.text().as_deref(), Some("{\"a\":\n1}"));
    }

    #[test]
    fn test_client_requires_api_key() {
        let config = Config {
            api_key: None,
            ..Config::default()
        };
        let api_key = config.resolve_api_key_with(|_| None);
        assert!(matches!(
            GeminiClient::with_api_key(&config, api_key),
            Err(ServiceError::MissingApiKey)
        ));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let config = Config {
            api_key: Some("secret-key".to_string()),
            ..Config::default()
        };
        let client = GeminiClient::new(&config).unwrap();
        let printed = format!("{:?}", client);
        assert!(!printed.contains("secret-key"));
        assert!(printed.contains(DEFAULT_IMAGE_MODEL));
    }
}
