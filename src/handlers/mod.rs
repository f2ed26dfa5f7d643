//! JSON API handlers.

pub mod cards;
pub mod study;

use axum::{
  extract::State,
  http::StatusCode,
  response::{IntoResponse, Response},
  routing::{get, post},
  Json, Router,
};
use serde_json::json;

use crate::domain::{ReviewError, Settings, StudyStats};
use crate::state::AppState;
use crate::store::{self, StoreError};

pub use cards::{create_card, get_card, preview_card, CreateCardRequest};
pub use study::{
  due_cards, due_count, submit_review, submit_swipe, CountResponse, DueParams, ReviewRequest,
  ReviewResponse, SwipeRequest,
};

/// Errors surfaced to API clients as `{ "error": message }`
#[derive(Debug)]
pub enum ApiError {
  NotFound(String),
  Invalid(String),
  Unavailable,
}

impl std::fmt::Display for ApiError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ApiError::NotFound(id) => write!(f, "Card not found: {}", id),
      ApiError::Invalid(msg) => write!(f, "{}", msg),
      ApiError::Unavailable => write!(f, "Card store unavailable"),
    }
  }
}

impl std::error::Error for ApiError {}

impl From<StoreError> for ApiError {
  fn from(err: StoreError) -> Self {
    match err {
      StoreError::CardNotFound(id) => ApiError::NotFound(id),
      StoreError::Unavailable => ApiError::Unavailable,
    }
  }
}

impl From<ReviewError> for ApiError {
  fn from(err: ReviewError) -> Self {
    ApiError::Invalid(err.to_string())
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
      ApiError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
    };
    if status.is_server_error() {
      tracing::error!("{}", self);
    } else {
      tracing::debug!("Rejected request: {}", self);
    }
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}

pub async fn get_stats(State(state): State<AppState>) -> Result<Json<StudyStats>, ApiError> {
  let store = store::try_lock(&state.store)?;
  Ok(Json(store.stats().clone()))
}

pub async fn get_settings(State(state): State<AppState>) -> Json<Settings> {
  Json(state.settings.as_ref().clone())
}

/// All API routes with the shared state attached
pub fn router(state: AppState) -> Router {
  Router::new()
    .route("/api/cards", post(create_card))
    .route("/api/cards/{id}", get(get_card))
    .route("/api/cards/{id}/preview", get(preview_card))
    .route("/api/due", get(due_cards))
    .route("/api/due/count", get(due_count))
    .route("/api/review", post(submit_review))
    .route("/api/review/swipe", post(submit_swipe))
    .route("/api/stats", get(get_stats))
    .route("/api/settings", get(get_settings))
    .with_state(state)
}
