use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    bouquet::{BouquetConfig, PartialBouquetConfig, QuickBrief},
    capabilities::{GeneratedImage, ImageAnalyzer, ImageGenerator, RecipeGenerator},
    catalog::Catalog,
    config::GeminiConfig,
    errors::{Result, StudioError},
    prompt::PromptBuilder,
    providers::gemini::ContentModel,
    recipe::RecipeItem,
    session::{GenerationSession, GenerationView, SessionRegistry},
};

/// Result of one generate cycle as seen by the caller that started it.
/// `stale` is set when a newer cycle for the same session began meanwhile;
/// the session view then keeps the newer result.
#[derive(Debug, Clone, Serialize)]
pub struct CycleOutcome {
    #[serde(flatten)]
    pub view: GenerationView,
    pub stale: bool,
}

pub struct AtelierController<M> {
    catalog: &'static Catalog,
    image: ImageGenerator<M>,
    recipe: RecipeGenerator<M>,
    analyzer: ImageAnalyzer<M>,
    sessions: SessionRegistry,
}

impl<M: ContentModel> AtelierController<M> {
    pub fn new(model: Arc<M>, config: &GeminiConfig, catalog: &'static Catalog) -> Self {
        Self {
            catalog,
            image: ImageGenerator::new(model.clone(), config.image_models.clone()),
            recipe: RecipeGenerator::new(
                model.clone(),
                config.text_model.clone(),
                config.recipe_image_mime.clone(),
                catalog,
            ),
            analyzer: ImageAnalyzer::new(model, config.text_model.clone(), catalog),
            sessions: SessionRegistry::new(),
        }
    }

    pub fn catalog(&self) -> &'static Catalog {
        self.catalog
    }

    fn prompts(&self) -> PromptBuilder<'static> {
        PromptBuilder::new(self.catalog)
    }

    /// Quick-create form: four answers in, one image out.
    pub async fn quick_create(&self, brief: &QuickBrief) -> Result<GeneratedImage> {
        let prompt = self.prompts().quick_prompt(brief);
        debug!(target: "atelier", %prompt, "quick-create prompt");
        self.image.generate(&prompt).await
    }

    pub async fn generate_image(&self, config: &BouquetConfig) -> Result<GeneratedImage> {
        let prompt = self.prompts().image_prompt(config);
        debug!(target: "atelier", %prompt, "atelier image prompt");
        self.image.generate(&prompt).await
    }

    pub async fn generate_recipe(
        &self,
        config: &BouquetConfig,
        image_data_uri: &str,
    ) -> Result<Vec<RecipeItem>> {
        self.recipe.generate(config, image_data_uri).await
    }

    pub async fn analyze_image(
        &self,
        mime_type: &str,
        bytes: &[u8],
    ) -> Result<PartialBouquetConfig> {
        self.analyzer.analyze(mime_type, bytes).await
    }

    /// Starting point for a cycle: the submitted selection (or the form
    /// defaults), then a named preset, then whatever a photo analysis matched.
    pub fn resolve_config(
        &self,
        config: Option<BouquetConfig>,
        preset: Option<&str>,
        analysis: Option<&PartialBouquetConfig>,
    ) -> Result<BouquetConfig> {
        let mut config =
            config.unwrap_or_else(|| BouquetConfig::with_catalog_defaults(self.catalog));

        if let Some(name) = preset.map(str::trim).filter(|name| !name.is_empty()) {
            let preset = self
                .catalog
                .preset(name)
                .ok_or_else(|| StudioError::UnknownPreset(name.to_string()))?;
            config.apply_preset(preset);
        }
        if let Some(analysis) = analysis {
            analysis.apply_to(&mut config);
        }

        Ok(config)
    }

    pub fn surprise_config(&self) -> BouquetConfig {
        BouquetConfig::surprise(self.catalog, &mut rand::thread_rng())
    }

    pub fn session_view(&self, id: &Uuid) -> Option<GenerationView> {
        self.sessions.get(id).map(|session| session.view())
    }

    /// Image first, then (if anything was requested) the recipe. A recipe
    /// failure only empties the recipe; the image stays.
    pub async fn run_cycle(&self, session_id: Option<Uuid>, config: &BouquetConfig) -> CycleOutcome {
        let session = match session_id {
            Some(id) => self.sessions.get_or_create(id),
            None => Arc::new(GenerationSession::new()),
        };

        let sequence = session.begin();
        let mut view = GenerationView::started(sequence);
        info!(target: "atelier", ?session_id, sequence, "generation cycle started");

        let image = match self.generate_image(config).await {
            Ok(image) => image,
            Err(err) => {
                warn!(target: "atelier", sequence, error = ?err, "image generation failed");
                let message = err.user_message();
                advance(&session, sequence, &mut view, |view| {
                    view.image_failed(message.clone())
                });
                return finish(&session, sequence, view);
            }
        };

        let image_url = image.data_uri();
        advance(&session, sequence, &mut view, |view| {
            view.image_ready(image_url.clone())
        });

        if !config.has_requested_flowers() {
            advance(&session, sequence, &mut view, |view| view.recipe_done(Vec::new()));
            return finish(&session, sequence, view);
        }

        advance(&session, sequence, &mut view, GenerationView::generating_recipe);

        let recipe = match self.generate_recipe(config, &image_url).await {
            Ok(recipe) => recipe,
            Err(err) => {
                warn!(target: "atelier", sequence, error = ?err, "recipe unavailable, keeping image only");
                Vec::new()
            }
        };
        advance(&session, sequence, &mut view, |view| view.recipe_done(recipe.clone()));

        finish(&session, sequence, view)
    }
}

fn advance(
    session: &GenerationSession,
    sequence: u64,
    view: &mut GenerationView,
    update: impl Fn(&mut GenerationView),
) {
    update(view);
    if !session.apply(sequence, &update) {
        debug!(target: "atelier", sequence, "newer cycle running, not updating session view");
    }
}

fn finish(session: &GenerationSession, sequence: u64, view: GenerationView) -> CycleOutcome {
    let stale = !session.is_current(sequence);
    if stale {
        info!(target: "atelier", sequence, "cycle finished after a newer one started");
    }
    CycleOutcome { view, stale }
}
