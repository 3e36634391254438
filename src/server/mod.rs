//! Element server: the HTTP backend the sandbox talks to.
//!
//! SYSTEM CONTEXT
//! ==============
//! Serves `GET /get_combination` from a recipe book seeded at startup and
//! accepts `POST /submit-score`. When a model provider is configured, pairs
//! the book does not know are generated once and remembered. CORS is open to
//! any origin so a browser front end on another port can reach it.

pub mod generate;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{ConfigError, ServerConfig};

pub use generate::{AnthropicGenerator, CombinationGenerator, GenerateError};
pub use state::{Recipe, RecipeBook, ServerState};

/// Errors that stop the element server from starting or serving.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Generator(#[from] GenerateError),

    /// The recipe seed file could not be read or parsed.
    #[error("recipe load failed: {0}")]
    Recipes(String),

    #[error("bind failed: {0}")]
    Bind(String),

    #[error("server failed: {0}")]
    Serve(String),
}

/// Router with every element endpoint, CORS and request tracing.
pub fn app(state: ServerState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/get_combination", get(routes::get_combination))
        .route("/submit-score", post(routes::submit_score))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build state from `config`, bind, and serve until the process stops.
///
/// # Errors
///
/// Returns a [`ServerError`] if recipes fail to load, the generator client
/// cannot be built, or the listener fails.
pub async fn run(config: &ServerConfig) -> Result<(), ServerError> {
    let recipes = match &config.recipes_path {
        Some(path) => RecipeBook::load(path).await?,
        None => RecipeBook::new(),
    };
    tracing::info!(recipes = recipes.len(), "recipe book loaded");

    let listener = TcpListener::bind(("0.0.0.0", config.port))
        .await
        .map_err(|e| ServerError::Bind(e.to_string()))?;
    let mut state = ServerState::new(recipes);
    match &config.generator {
        Some(generator) => {
            let generator = AnthropicGenerator::new(generator)?;
            tracing::info!(model = generator.model(), "combination generation enabled");
            state = state.with_generator(Arc::new(generator));
        }
        None => tracing::info!("combination generation disabled; unknown pairs answer null"),
    }

    tracing::info!(port = config.port, "essentia listening");
    serve(listener, state).await
}

/// Serve on an already-bound listener.
///
/// # Errors
///
/// Returns `ServerError::Serve` if the server stops with an I/O error.
pub async fn serve(listener: TcpListener, state: ServerState) -> Result<(), ServerError> {
    axum::serve(listener, app(state))
        .await
        .map_err(|e| ServerError::Serve(e.to_string()))
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
