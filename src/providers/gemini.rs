use std::future::Future;

use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    config::GeminiConfig,
    errors::{Result, StudioError},
};

/// A remote `generateContent`-style model. The HTTP client implements it for
/// production; tests script their own.
pub trait ContentModel: Send + Sync {
    /// Fails with [`StudioError::MissingConfig`] when no call could succeed.
    fn ensure_configured(&self) -> Result<()>;

    fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> impl Future<Output = Result<GenerateContentResponse>> + Send;
}

/// Gemini REST client (`models/{model}:generateContent`).
///
/// The key may be absent: the service still starts and every call then fails
/// with a configuration error before anything goes on the wire.
#[derive(Clone)]
pub struct GeminiModel {
    http_client: HttpClient,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiModel {
    pub fn from_config(config: &GeminiConfig) -> Result<Self> {
        let http_client = HttpClient::builder()
            .user_agent("BouquetAtelier/0.1")
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http_client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

impl ContentModel for GeminiModel {
    fn ensure_configured(&self) -> Result<()> {
        match &self.api_key {
            Some(_) => Ok(()),
            None => Err(StudioError::MissingConfig("gemini.api_key")),
        }
    }

    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(StudioError::MissingConfig("gemini.api_key"))?;

        let endpoint = self.endpoint(model);
        debug!(target: "gemini", %endpoint, "sending generateContent request");

        let response = self
            .http_client
            .post(&endpoint)
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StudioError::Upstream { status, body });
        }

        Ok(response.json::<GenerateContentResponse>().await?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![Content::user(vec![Part::text(prompt)])],
            generation_config: None,
        }
    }

    /// Image first, then the instruction, as a single user turn.
    pub fn image_and_text(image: InlineData, prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![Content::user(vec![
                Part::inline(image),
                Part::text(prompt),
            ])],
            generation_config: None,
        }
    }

    pub fn expecting_image(mut self) -> Self {
        self.generation_config = Some(GenerationConfig {
            response_modalities: Some(vec!["TEXT".to_string(), "IMAGE".to_string()]),
            response_mime_type: None,
        });
        self
    }

    pub fn expecting_json(mut self) -> Self {
        self.generation_config = Some(GenerationConfig {
            response_modalities: None,
            response_mime_type: Some("application/json".to_string()),
        });
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts,
        }
    }

    #[cfg(test)]
    pub fn model(parts: Vec<Part>) -> Self {
        Self {
            role: Some("model".to_string()),
            parts,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    pub fn inline(data: InlineData) -> Self {
        Self {
            text: None,
            inline_data: Some(data),
        }
    }
}

/// Base64 payload plus its MIME type, exactly as it travels on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Option<Vec<Candidate>>,
}

impl GenerateContentResponse {
    #[cfg(test)]
    pub fn from_parts(parts: Vec<Part>) -> Self {
        Self {
            candidates: Some(vec![Candidate {
                content: Some(Content::model(parts)),
            }]),
        }
    }

    /// Every part of every candidate, in response order.
    pub fn parts(&self) -> impl Iterator<Item = &Part> {
        self.candidates
            .iter()
            .flatten()
            .filter_map(|candidate| candidate.content.as_ref())
            .flat_map(|content| content.parts.iter())
    }

    /// Concatenated text of the first candidate.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.as_ref()?.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        if text.is_empty() { None } else { Some(text) }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}
