use std::sync::Arc;

use tracing::info;

use crate::{
    bouquet::PartialBouquetConfig,
    capabilities::GeneratedImage,
    catalog::Catalog,
    errors::{Result, StudioError},
    prompt::PromptBuilder,
    providers::gemini::{ContentModel, GenerateContentRequest},
    response::parse_analysis,
};

/// Reads an uploaded bouquet photo back into catalog selections.
pub struct ImageAnalyzer<M> {
    model: Arc<M>,
    model_name: String,
    catalog: &'static Catalog,
}

impl<M: ContentModel> ImageAnalyzer<M> {
    pub fn new(model: Arc<M>, model_name: impl Into<String>, catalog: &'static Catalog) -> Self {
        Self {
            model,
            model_name: model_name.into(),
            catalog,
        }
    }

    pub async fn analyze(&self, mime_type: &str, bytes: &[u8]) -> Result<PartialBouquetConfig> {
        if !mime_type.starts_with("image/") {
            return Err(StudioError::invalid_image(format!(
                "expected an image upload, got {mime_type:?}"
            )));
        }
        if bytes.is_empty() {
            return Err(StudioError::invalid_image("upload is empty"));
        }

        self.model.ensure_configured()?;

        let image = GeneratedImage::from_bytes(mime_type, bytes);
        let prompt = PromptBuilder::new(self.catalog).analysis_prompt();
        let request =
            GenerateContentRequest::image_and_text(image.to_inline(), prompt).expecting_json();

        let response = self
            .model
            .generate_content(&self.model_name, &request)
            .await?;
        let text = response
            .text()
            .ok_or_else(|| StudioError::parse("analysis response carried no text"))?;

        let partial = parse_analysis(&text, self.catalog)?;
        if partial.is_empty() {
            info!(target: "image_analyzer", "nothing in the photo matched the catalog");
        }
        Ok(partial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::scripted::{Reply, ScriptedModel};

    fn analyzer(model: &Arc<ScriptedModel>) -> ImageAnalyzer<ScriptedModel> {
        ImageAnalyzer::new(model.clone(), "vision", Catalog::standard())
    }

    #[tokio::test]
    async fn upload_is_sent_as_inline_base64() {
        let model = Arc::new(ScriptedModel::new([Reply::json(
            r#"{"flowers":["Sunflowers","Daisies"],"colorPalette":"Vibrant Meadow","arrangementStyle":"Unknown","shape":"Hand-tied"}"#,
        )]));

        let partial = analyzer(&model)
            .analyze("image/png", b"\x89PNG\r\n\x1a\n")
            .await
            .unwrap();

        assert_eq!(
            partial.flowers,
            Some(vec!["sunflowers".to_string(), "daisies".to_string()])
        );
        assert_eq!(partial.color_palette.as_deref(), Some("vibrant_meadow"));
        assert_eq!(partial.arrangement_style, None);
        assert_eq!(partial.shape.as_deref(), Some("Hand-tied"));

        let request = &model.requests()[0];
        let inline = request.contents[0].parts[0].inline_data.as_ref().unwrap();
        assert_eq!(inline.mime_type, "image/png");
        assert_eq!(inline.data, "iVBORw0KGgo=");
        assert_eq!(model.models_called(), vec!["vision"]);
    }

    #[tokio::test]
    async fn non_images_are_rejected_without_calling() {
        let model = Arc::new(ScriptedModel::new([]));
        let result = analyzer(&model).analyze("application/pdf", b"%PDF").await;
        assert!(matches!(result, Err(StudioError::InvalidImage(_))));

        let result = analyzer(&model).analyze("image/jpeg", b"").await;
        assert!(matches!(result, Err(StudioError::InvalidImage(_))));
        assert!(model.models_called().is_empty());
    }

    #[tokio::test]
    async fn unreadable_answer_is_a_parse_error() {
        let model = Arc::new(ScriptedModel::new([Reply::json("a lovely bouquet")]));
        let result = analyzer(&model).analyze("image/jpeg", b"\xff\xd8\xff").await;
        assert!(matches!(result, Err(StudioError::Parse(_))));
    }
}
