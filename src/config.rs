use std::{env, net::SocketAddr, time::Duration};

use anyhow::Context;
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "config/atelier.toml";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_IMAGE_MODELS: [&str; 2] = [
    "gemini-2.0-flash-exp",
    "gemini-2.0-flash-preview-image-generation",
];
const DEFAULT_TEXT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_TIMEOUT_SECONDS: u64 = 60;
const DEFAULT_RECIPE_IMAGE_MIME: &str = "image/jpeg";

/// Checked in order when the config file leaves the key out.
const API_KEY_ENV_VARS: [&str; 2] = ["GOOGLE_AI_API_KEY", "GOOGLE_GEMINI_API_KEY"];

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

#[derive(Clone, Debug)]
pub struct GeminiConfig {
    /// `None` is allowed at startup; every request then fails with a setup error.
    pub api_key: Option<String>,
    pub base_url: String,
    pub image_models: Vec<String>,
    pub text_model: String,
    pub timeout: Duration,
    pub recipe_image_mime: String,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub gemini: GeminiConfig,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let config_path =
            env::var("ATELIER_CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let settings = Config::builder()
            .add_source(File::new(&config_path, FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix("ATELIER")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("gemini.image_models"),
            )
            .build()
            .with_context(|| format!("failed to read configuration from {config_path:?}"))?;

        let file_config: FileConfig = settings
            .try_deserialize()
            .with_context(|| format!("failed to parse configuration from {config_path:?}"))?;

        file_config.into_domain(|name| env::var(name).ok())
    }
}

#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    #[serde(default)]
    server: Option<FileServerConfig>,
    #[serde(default)]
    gemini: Option<FileGeminiConfig>,
}

impl FileConfig {
    fn into_domain(self, lookup_env: impl Fn(&str) -> Option<String>) -> anyhow::Result<AppConfig> {
        let server = self.server.unwrap_or_default().into_domain()?;
        let gemini = self.gemini.unwrap_or_default().into_domain(lookup_env);
        Ok(AppConfig { server, gemini })
    }
}

#[derive(Debug, Deserialize, Default)]
struct FileServerConfig {
    #[serde(default)]
    bind_addr: Option<String>,
}

impl FileServerConfig {
    fn into_domain(self) -> anyhow::Result<ServerConfig> {
        let bind_addr_str = self
            .bind_addr
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr_str
            .parse::<SocketAddr>()
            .with_context(|| format!("failed to parse server.bind_addr: {bind_addr_str}"))?;
        Ok(ServerConfig { bind_addr })
    }
}

#[derive(Debug, Deserialize, Default)]
struct FileGeminiConfig {
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    image_models: Option<Vec<String>>,
    #[serde(default)]
    text_model: Option<String>,
    #[serde(default)]
    timeout_seconds: Option<u64>,
    #[serde(default)]
    recipe_image_mime: Option<String>,
}

impl FileGeminiConfig {
    fn into_domain(self, lookup_env: impl Fn(&str) -> Option<String>) -> GeminiConfig {
        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .or_else(|| {
                API_KEY_ENV_VARS
                    .iter()
                    .find_map(|name| lookup_env(name).filter(|key| !key.trim().is_empty()))
            });

        let image_models = self
            .image_models
            .map(|models| {
                models
                    .into_iter()
                    .map(|model| model.trim().to_string())
                    .filter(|model| !model.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|models| !models.is_empty())
            .unwrap_or_else(|| DEFAULT_IMAGE_MODELS.iter().map(|m| m.to_string()).collect());

        let timeout_seconds = self
            .timeout_seconds
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS)
            .max(5);

        GeminiConfig {
            api_key,
            base_url: self
                .base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            image_models,
            text_model: self
                .text_model
                .unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
            timeout: Duration::from_secs(timeout_seconds),
            recipe_image_mime: self
                .recipe_image_mime
                .unwrap_or_else(|| DEFAULT_RECIPE_IMAGE_MIME.to_string()),
        }
    }
}
