mod analysis;
mod image;
mod recipe;

pub use analysis::ImageAnalyzer;
pub use image::ImageGenerator;
pub use recipe::RecipeGenerator;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;

use crate::{
    errors::{Result, StudioError},
    providers::gemini::InlineData,
};

/// An image held as MIME type plus base64 payload. Shown to the browser as a
/// `data:` URI and never written anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    mime_type: String,
    data: String,
}

impl GeneratedImage {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self::new(mime_type, BASE64_STANDARD.encode(bytes))
    }

    /// Reads `data:<mime>;base64,<payload>`. A header without a MIME type
    /// takes `fallback_mime`.
    pub fn from_data_uri(uri: &str, fallback_mime: &str) -> Result<Self> {
        let (header, payload) = uri
            .trim()
            .split_once(',')
            .ok_or_else(|| StudioError::invalid_image("expected a data: URI"))?;

        if payload.is_empty() {
            return Err(StudioError::invalid_image("data: URI carries no payload"));
        }
        BASE64_STANDARD
            .decode(payload)
            .map_err(|err| StudioError::invalid_image(format!("payload is not base64: {err}")))?;

        let mime_type = header
            .strip_prefix("data:")
            .and_then(|rest| rest.split(';').next())
            .filter(|mime| !mime.is_empty())
            .unwrap_or(fallback_mime);

        Ok(Self::new(mime_type, payload))
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    pub fn to_inline(&self) -> InlineData {
        InlineData {
            mime_type: self.mime_type.clone(),
            data: self.data.clone(),
        }
    }
}
