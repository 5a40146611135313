use std::sync::Arc;

use tracing::debug;

use crate::{
    bouquet::BouquetConfig,
    capabilities::GeneratedImage,
    catalog::Catalog,
    errors::{Result, StudioError},
    prompt::PromptBuilder,
    providers::gemini::{ContentModel, GenerateContentRequest},
    recipe::RecipeItem,
    response::parse_recipe,
};

/// Asks a text model for the stems needed to rebuild a generated bouquet.
pub struct RecipeGenerator<M> {
    model: Arc<M>,
    model_name: String,
    fallback_mime: String,
    catalog: &'static Catalog,
}

impl<M: ContentModel> RecipeGenerator<M> {
    pub fn new(
        model: Arc<M>,
        model_name: impl Into<String>,
        fallback_mime: impl Into<String>,
        catalog: &'static Catalog,
    ) -> Self {
        Self {
            model,
            model_name: model_name.into(),
            fallback_mime: fallback_mime.into(),
            catalog,
        }
    }

    pub async fn generate(
        &self,
        config: &BouquetConfig,
        image_data_uri: &str,
    ) -> Result<Vec<RecipeItem>> {
        self.model.ensure_configured()?;

        let Some(prompt) = PromptBuilder::new(self.catalog).recipe_prompt(config) else {
            debug!(target: "recipe_generator", "no resolvable flowers requested, skipping recipe");
            return Ok(Vec::new());
        };

        let image = GeneratedImage::from_data_uri(image_data_uri, &self.fallback_mime)?;
        let request =
            GenerateContentRequest::image_and_text(image.to_inline(), prompt).expecting_json();

        let response = self
            .model
            .generate_content(&self.model_name, &request)
            .await?;
        let text = response
            .text()
            .ok_or_else(|| StudioError::parse("recipe response carried no text"))?;

        parse_recipe(&text)
    }
}
