//! The HTTP proxy: three task endpoints in front of one shared model.

mod errors;
mod handlers;

pub use errors::ApiError;
pub use handlers::{AiResponse, ChatRequest, CodeHelperRequest, SummarizerRequest};

use crate::{config::Config, BoxedError};
use assistant_sdk::{
    google::{GoogleModel, GoogleModelOptions},
    LanguageModel,
};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared by every request. Holds nothing but the model client.
#[derive(Clone)]
pub struct AppState {
    model: Option<Arc<dyn LanguageModel>>,
}

impl AppState {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model: Some(model) }
    }

    /// A state whose requests all fail with [`ApiError::ModelUnavailable`].
    #[must_use]
    pub fn uninitialized() -> Self {
        Self { model: None }
    }

    fn model(&self) -> Result<&dyn LanguageModel, ApiError> {
        self.model.as_deref().ok_or(ApiError::ModelUnavailable)
    }
}

/// Routes without CORS, as used by [`serve`] and by tests.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::home_handler))
        .route("/chat", post(handlers::chat_handler))
        .route("/code-helper", post(handlers::code_helper_handler))
        .route("/summarizer", post(handlers::summarizer_handler))
        .with_state(state)
}

/// Build the Gemini client described by `config`.
#[must_use]
pub fn gemini_model(config: &Config) -> GoogleModel {
    GoogleModel::new(
        config.gemini_model.clone(),
        GoogleModelOptions {
            api_key: config.gemini_api_key.clone(),
            base_url: config.gemini_base_url.clone(),
            ..Default::default()
        },
    )
}

pub fn cors_layer(app_url: &str) -> Result<CorsLayer, BoxedError> {
    let origin: HeaderValue = app_url.parse()?;
    Ok(CorsLayer::new()
        .allow_origin([origin])
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]))
}

/// Bind `0.0.0.0:{port}` and serve until the process receives Ctrl-C.
pub async fn serve(config: Config) -> Result<(), BoxedError> {
    let model = gemini_model(&config);
    tracing::info!(model_id = %config.gemini_model, "Gemini API initialized");

    let app = router(AppState::new(Arc::new(model)))
        .layer(cors_layer(&config.app_url)?)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!("Server running on http://localhost:{}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %err, "failed to listen for shutdown signal");
            }
        })
        .await?;

    Ok(())
}
