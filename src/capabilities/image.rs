use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    capabilities::GeneratedImage,
    errors::{Result, StudioError},
    providers::gemini::{ContentModel, GenerateContentRequest},
    response::first_image,
};

/// Generates the preview image, walking an ordered list of model names until
/// one of them returns an image part.
pub struct ImageGenerator<M> {
    model: Arc<M>,
    model_names: Vec<String>,
}

impl<M: ContentModel> ImageGenerator<M> {
    pub fn new(model: Arc<M>, model_names: Vec<String>) -> Self {
        Self { model, model_names }
    }

    pub async fn generate(&self, prompt: &str) -> Result<GeneratedImage> {
        self.model.ensure_configured()?;

        let request = GenerateContentRequest::text(prompt).expecting_image();
        let mut failures = Vec::new();

        for (attempt, model_name) in self.model_names.iter().enumerate() {
            if attempt > 0 {
                info!(target: "image_generator", model = %model_name, "retrying with fallback model");
            }

            match self.model.generate_content(model_name, &request).await {
                Ok(response) => match first_image(&response) {
                    Some(image) => {
                        info!(target: "image_generator", model = %model_name, mime = image.mime_type(), "image generated");
                        return Ok(image);
                    }
                    None => {
                        warn!(target: "image_generator", model = %model_name, "response carried no image part");
                        failures.push(format!("{model_name}: no image in response"));
                    }
                },
                Err(err @ StudioError::MissingConfig(_)) => return Err(err),
                Err(err) => {
                    warn!(target: "image_generator", model = %model_name, error = ?err, "image request failed");
                    failures.push(format!("{model_name}: {err}"));
                }
            }
        }

        if failures.is_empty() {
            return Err(StudioError::generation("no image models configured"));
        }
        Err(StudioError::generation(failures.join("; ")))
    }
}
