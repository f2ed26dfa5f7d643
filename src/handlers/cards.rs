//! Card creation and lookup.

use axum::{
  extract::{Path, State},
  http::StatusCode,
  Json,
};
use chrono::Utc;
use serde::Deserialize;

use crate::domain::{Card, CardContent};
use crate::srs::{self, ReviewPreview};
use crate::state::AppState;
use crate::store::{self, CardStore};

use super::ApiError;

#[derive(Debug, Deserialize)]
pub struct CreateCardRequest {
  pub front: String,
  pub back: String,
  #[serde(flatten)]
  pub content: CardContent,
}

/// POST /api/cards
pub async fn create_card(
  State(state): State<AppState>,
  Json(request): Json<CreateCardRequest>,
) -> Result<(StatusCode, Json<Card>), ApiError> {
  if request.front.trim().is_empty() || request.back.trim().is_empty() {
    return Err(ApiError::Invalid("front and back must not be empty".to_string()));
  }

  let card = Card::new(&request.front, &request.back, request.content, Utc::now());
  let mut store = store::try_lock(&state.store)?;
  store.save_card(card.clone())?;
  tracing::debug!(card_id = %card.id, "Created card");

  Ok((StatusCode::CREATED, Json(card)))
}

/// GET /api/cards/{id}
pub async fn get_card(
  State(state): State<AppState>,
  Path(id): Path<String>,
) -> Result<Json<Card>, ApiError> {
  let store = store::try_lock(&state.store)?;
  Ok(Json(store.get_card(&id)?))
}

/// GET /api/cards/{id}/preview
pub async fn preview_card(
  State(state): State<AppState>,
  Path(id): Path<String>,
) -> Result<Json<[ReviewPreview; 5]>, ApiError> {
  let card = store::try_lock(&state.store)?.get_card(&id)?;
  Ok(Json(srs::preview_review(&card, &state.settings, Utc::now())))
}
