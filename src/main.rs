mod api;
mod bouquet;
mod capabilities;
mod catalog;
mod config;
mod errors;
mod orchestrator;
mod prompt;
mod providers;
mod recipe;
mod response;
mod session;
mod util;

use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    catalog::Catalog, errors::Result, orchestrator::AtelierController,
    providers::gemini::GeminiModel, util::LocalTimer,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    init_tracing();

    let config = config::AppConfig::load()?;

    if config.gemini.api_key.is_none() {
        warn!(
            target: "config",
            "no Gemini API key found; generation requests will answer with a setup message"
        );
    }

    let model = GeminiModel::from_config(&config.gemini)?;
    let controller = Arc::new(AtelierController::new(
        Arc::new(model),
        &config.gemini,
        Catalog::standard(),
    ));

    info!(
        target: "config",
        image_models = ?config.gemini.image_models,
        text_model = %config.gemini.text_model,
        "bouquet atelier configured"
    );

    api::run_server(config.server.bind_addr, api::router(controller)).await
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_timer(LocalTimer)
        .init();

    info!("tracing initialized");
}
