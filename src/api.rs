use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    bouquet::{BouquetConfig, PartialBouquetConfig, QuickBrief},
    catalog::Catalog,
    errors::{Result, StudioError},
    orchestrator::{AtelierController, CycleOutcome},
    providers::gemini::ContentModel,
};

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub struct AppState<M> {
    controller: Arc<AtelierController<M>>,
}

impl<M> Clone for AppState<M> {
    fn clone(&self) -> Self {
        Self {
            controller: self.controller.clone(),
        }
    }
}

pub fn router<M: ContentModel + 'static>(controller: Arc<AtelierController<M>>) -> Router {
    Router::new()
        .route("/api/generate-bouquet", post(generate_bouquet::<M>))
        .route("/api/atelier/catalog", get(catalog::<M>))
        .route("/api/atelier/generate", post(atelier_generate::<M>))
        .route("/api/atelier/surprise", post(atelier_surprise::<M>))
        .route("/api/atelier/analyze", post(atelier_analyze::<M>))
        .route("/api/atelier/sessions/{id}", get(session_view::<M>))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(AppState { controller })
}

pub async fn run_server(addr: SocketAddr, app: Router) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(target: "http", %addr, "bouquet atelier listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| StudioError::other(format!("HTTP server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(target: "http", error = ?err, "failed to listen for Ctrl-C");
        return;
    }
    info!(target: "http", "shutdown signal received");
}

/// Maps the error taxonomy onto `{ "error": ... }` responses.
pub struct ApiError(StudioError);

impl From<StudioError> for ApiError {
    fn from(value: StudioError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            StudioError::InvalidImage(_) | StudioError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            StudioError::UnknownPreset(_) => StatusCode::NOT_FOUND,
            StudioError::Parse(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(target: "http", error = ?self.0, "request failed");
        } else {
            warn!(target: "http", error = ?self.0, "request rejected");
        }

        (status, Json(json!({ "error": self.0.user_message() }))).into_response()
    }
}

/// `POST /api/generate-bouquet`: every failure, a malformed body included,
/// answers 500 with `{error}`.
async fn generate_bouquet<M: ContentModel + 'static>(
    State(state): State<AppState<M>>,
    body: std::result::Result<Json<QuickBrief>, JsonRejection>,
) -> std::result::Result<Json<serde_json::Value>, Response> {
    let Json(brief) = body.map_err(|rejection| {
        warn!(target: "http", error = %rejection.body_text(), "unreadable quick-create body");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to generate bouquet" })),
        )
            .into_response()
    })?;

    let image = state
        .controller
        .quick_create(&brief)
        .await
        .map_err(|err| {
            error!(target: "http", error = ?err, "quick-create failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": err.user_message() })),
            )
                .into_response()
        })?;

    Ok(Json(json!({ "imageUrl": image.data_uri() })))
}

async fn catalog<M: ContentModel + 'static>(
    State(state): State<AppState<M>>,
) -> Json<&'static Catalog> {
    Json(state.controller.catalog())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct GenerateBody {
    session_id: Option<Uuid>,
    preset: Option<String>,
    config: Option<BouquetConfig>,
    analysis: Option<PartialBouquetConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SurpriseBody {
    session_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
struct CycleResponse {
    config: BouquetConfig,
    #[serde(flatten)]
    outcome: CycleOutcome,
}

fn read_json<T>(body: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| StudioError::InvalidRequest(rejection.body_text()))
}

async fn atelier_generate<M: ContentModel + 'static>(
    State(state): State<AppState<M>>,
    body: std::result::Result<Json<GenerateBody>, JsonRejection>,
) -> std::result::Result<Json<CycleResponse>, ApiError> {
    let body = read_json(body)?;
    let config = state
        .controller
        .resolve_config(body.config, body.preset.as_deref(), body.analysis.as_ref())?;

    let outcome = state.controller.run_cycle(body.session_id, &config).await;
    Ok(Json(CycleResponse { config, outcome }))
}

async fn atelier_surprise<M: ContentModel + 'static>(
    State(state): State<AppState<M>>,
    body: std::result::Result<Json<SurpriseBody>, JsonRejection>,
) -> std::result::Result<Json<CycleResponse>, ApiError> {
    // An empty body is fine here; it just means no session.
    let session_id = read_json(body).ok().and_then(|body| body.session_id);
    let config = state.controller.surprise_config();

    let outcome = state.controller.run_cycle(session_id, &config).await;
    Ok(Json(CycleResponse { config, outcome }))
}

async fn atelier_analyze<M: ContentModel + 'static>(
    State(state): State<AppState<M>>,
    headers: HeaderMap,
    body: Bytes,
) -> std::result::Result<Json<PartialBouquetConfig>, ApiError> {
    let mime_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.split(';').next().unwrap_or(value).trim().to_string())
        .unwrap_or_default();

    let partial = state.controller.analyze_image(&mime_type, &body).await?;
    Ok(Json(partial))
}

async fn session_view<M: ContentModel + 'static>(
    State(state): State<AppState<M>>,
    Path(id): Path<Uuid>,
) -> Response {
    match state.controller.session_view(&id) {
        Some(view) => Json(view).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Unknown session" })),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::GeminiConfig,
        providers::scripted::{Reply, ScriptedModel},
    };
    use axum::{body::Body, http::Request};
    use serde_json::Value;
    use std::time::Duration;
    use tower::ServiceExt;

    fn app(model: ScriptedModel) -> (Router, Arc<ScriptedModel>) {
        let model = Arc::new(model);
        let config = GeminiConfig {
            api_key: Some("test".into()),
            base_url: "http://127.0.0.1:9".into(),
            image_models: vec!["primary".into(), "alternate".into()],
            text_model: "text".into(),
            timeout: Duration::from_secs(5),
            recipe_image_mime: "image/jpeg".into(),
        };
        let controller = Arc::new(AtelierController::new(
            model.clone(),
            &config,
            Catalog::standard(),
        ));
        (router(controller), model)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn read_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn quick_create_returns_image_url() {
        let (app, model) = app(ScriptedModel::new([Reply::image()]));
        let response = app
            .oneshot(post_json(
                "/api/generate-bouquet",
                json!({"budget": "150", "vibe": "modern", "colors": "pastels", "occasion": "wedding"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_body(response).await;
        assert!(body["imageUrl"].as_str().unwrap().starts_with("data:image/png;base64,"));
        assert_eq!(model.models_called(), vec!["primary"]);
    }

    #[tokio::test]
    async fn quick_create_without_image_is_500_after_one_fallback() {
        let (app, model) = app(ScriptedModel::new([Reply::text_only(), Reply::text_only()]));
        let response = app
            .oneshot(post_json("/api/generate-bouquet", json!({"vibe": "romantic"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = read_body(response).await;
        assert_eq!(body["error"], "Could not generate image. Please try again.");
        assert_eq!(model.models_called(), vec!["primary", "alternate"]);
    }

    #[tokio::test]
    async fn quick_create_without_key_is_500_setup_message() {
        let (app, model) = app(ScriptedModel::unconfigured());
        let response = app
            .oneshot(post_json("/api/generate-bouquet", json!({})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = read_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("GOOGLE_AI_API_KEY"));
        assert!(model.models_called().is_empty());
    }

    #[tokio::test]
    async fn quick_create_with_garbage_body_is_500() {
        let (app, _) = app(ScriptedModel::new([]));
        let request = Request::builder()
            .method("POST")
            .uri("/api/generate-bouquet")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(read_body(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn atelier_generate_with_preset_runs_full_cycle() {
        let (app, _) = app(ScriptedModel::new([
            Reply::image(),
            Reply::json(r#"{"recipe":[{"name":"Rose","quantity":12,"pricePerStem":"$2.50"}]}"#),
        ]));
        let session_id = Uuid::new_v4();

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/atelier/generate",
                json!({"sessionId": session_id, "preset": "Romantic Gesture"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_body(response).await;

        assert_eq!(body["phase"], "recipe_ready");
        assert_eq!(body["stale"], false);
        assert_eq!(body["totalCostDisplay"], "$30.00");
        assert_eq!(body["config"]["flowers"], json!(["roses", "lilies", "eucalyptus"]));
        assert_eq!(body["sequence"], 1);

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/atelier/sessions/{session_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_body(response).await["phase"], "recipe_ready");
    }

    #[tokio::test]
    async fn empty_generate_body_starts_from_the_fresh_form() {
        let (app, model) = app(ScriptedModel::new([
            Reply::image(),
            Reply::json(r#"{"recipe":[{"name":"Rose","quantity":10,"pricePerStem":"$3.00"}]}"#),
        ]));
        let response = app
            .oneshot(post_json("/api/atelier/generate", json!({})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_body(response).await;
        assert_eq!(body["config"]["flowers"], json!(["roses"]));
        assert_eq!(body["phase"], "recipe_ready");
        assert_eq!(body["totalCostDisplay"], "$30.00");
        assert_eq!(model.models_called(), vec!["primary", "text"]);
    }

    #[tokio::test]
    async fn unknown_preset_is_404() {
        let (app, model) = app(ScriptedModel::new([]));
        let response = app
            .oneshot(post_json("/api/atelier/generate", json!({"preset": "Nope"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(model.models_called().is_empty());
    }

    #[tokio::test]
    async fn surprise_echoes_random_config() {
        let (app, _) = app(ScriptedModel::new([Reply::image(), Reply::json(r#"{"recipe": []}"#)]));
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/atelier/surprise")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_body(response).await;
        let flowers = body["config"]["flowers"].as_array().unwrap();
        assert!((2..=5).contains(&flowers.len()));
        assert_eq!(body["phase"], "recipe_empty");
    }

    #[tokio::test]
    async fn analyze_returns_partial_config() {
        let (app, _) = app(ScriptedModel::new([Reply::json(
            r#"{"flowers":["Orchids"],"colorPalette":"Mystery","shape":"Posy"}"#,
        )]));
        let request = Request::builder()
            .method("POST")
            .uri("/api/atelier/analyze")
            .header(CONTENT_TYPE, "image/jpeg")
            .body(Body::from(vec![0xff, 0xd8, 0xff]))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_body(response).await;
        assert_eq!(body, json!({"flowers": ["orchids"], "shape": "Posy"}));
    }

    #[tokio::test]
    async fn analyze_rejects_non_images() {
        let (app, _) = app(ScriptedModel::new([]));
        let request = Request::builder()
            .method("POST")
            .uri("/api/atelier/analyze")
            .header(CONTENT_TYPE, "text/plain")
            .body(Body::from("hello"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn catalog_lists_presets_and_quick_options() {
        let (app, _) = app(ScriptedModel::new([]));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/atelier/catalog")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let body = read_body(response).await;
        assert_eq!(body["presets"].as_array().unwrap().len(), 3);
        assert_eq!(body["sizes"], json!(["Small", "Medium", "Large", "Extra Large"]));
        assert_eq!(body["quick"]["vibes"][0]["value"], "romantic");
    }

    #[tokio::test]
    async fn unknown_session_is_404() {
        let (app, _) = app(ScriptedModel::new([]));
        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/atelier/sessions/{}", Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
