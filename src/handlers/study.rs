//! Study session handlers: due set, due count and grading.

use axum::{
  extract::{Query, State},
  Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config;
use crate::domain::{Card, ReviewOutcome, ReviewQuality};
use crate::srs::{self, DueQuery, GroupFilter, StudyMode};
use crate::state::AppState;
use crate::store::{self, CardStore};

use super::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct DueParams {
  /// Comma separated group ids; empty or absent means all groups
  pub groups: Option<String>,
  /// "normal" (default), "all" or "intensive"
  pub mode: Option<String>,
  pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CountParams {
  pub groups: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CountResponse {
  pub count: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
  pub card_id: String,
  pub quality: u8,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwipeRequest {
  pub card_id: String,
  pub recalled: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewResponse {
  pub card: Card,
  pub outcome: ReviewOutcome,
}

fn parse_groups(groups: Option<&str>) -> GroupFilter {
  GroupFilter::from_ids(
    groups
      .unwrap_or_default()
      .split(',')
      .map(str::trim)
      .filter(|g| !g.is_empty()),
  )
}

fn parse_mode(mode: Option<&str>) -> Result<StudyMode, ApiError> {
  match mode {
    None => Ok(StudyMode::Normal),
    Some(m) => {
      StudyMode::from_str(m).ok_or_else(|| ApiError::Invalid(format!("unknown study mode: {}", m)))
    }
  }
}

/// Build the selector query. Only normal sessions get the default size;
/// all-due and intensive sessions are uncapped unless a limit is given.
fn due_query(params: &DueParams) -> Result<DueQuery, ApiError> {
  let mode = parse_mode(params.mode.as_deref())?;
  let limit = match mode {
    StudyMode::Normal => Some(params.limit.unwrap_or(config::DEFAULT_DUE_LIMIT)),
    StudyMode::AllDue | StudyMode::Intensive => params.limit,
  };
  Ok(DueQuery {
    groups: parse_groups(params.groups.as_deref()),
    mode,
    limit,
  })
}

/// GET /api/due
pub async fn due_cards(
  State(state): State<AppState>,
  Query(params): Query<DueParams>,
) -> Result<Json<Vec<Card>>, ApiError> {
  let query = due_query(&params)?;

  let store = store::try_lock(&state.store)?;
  let selected = srs::select_due_cards(store.cards(), &query, &state.settings, Utc::now());
  Ok(Json(selected.into_iter().cloned().collect()))
}

/// GET /api/due/count
pub async fn due_count(
  State(state): State<AppState>,
  Query(params): Query<CountParams>,
) -> Result<Json<CountResponse>, ApiError> {
  let groups = parse_groups(params.groups.as_deref());
  let store = store::try_lock(&state.store)?;
  let count = srs::count_due_cards(store.cards(), &groups, &state.settings, Utc::now());
  Ok(Json(CountResponse { count }))
}

/// Grade one card, write it back and update the study stats.
fn grade_card(state: &AppState, card_id: &str, quality: ReviewQuality) -> Result<ReviewResponse, ApiError> {
  let now = Utc::now();
  let mut store = store::try_lock(&state.store)?;

  let before = store.get_card(card_id)?;
  let after = srs::process_review(&before, quality, &state.settings, now);
  let outcome = ReviewOutcome::from_transition(&before, &after, quality);

  store.save_card(after.clone())?;
  store
    .stats_mut()
    .record_review(outcome.success, &after.groups, now);

  if outcome.newly_mastered {
    tracing::info!(card_id = %after.id, interval = after.interval, "Card mastered");
  }
  if outcome.lapsed && after.is_leech(state.settings.leech_threshold) {
    tracing::info!(card_id = %after.id, lapses = after.lapses, "Card became a leech");
  }

  Ok(ReviewResponse { card: after, outcome })
}

/// POST /api/review
pub async fn submit_review(
  State(state): State<AppState>,
  Json(request): Json<ReviewRequest>,
) -> Result<Json<ReviewResponse>, ApiError> {
  let quality = ReviewQuality::try_from(request.quality)?;
  grade_card(&state, &request.card_id, quality).map(Json)
}

/// POST /api/review/swipe
pub async fn submit_swipe(
  State(state): State<AppState>,
  Json(request): Json<SwipeRequest>,
) -> Result<Json<ReviewResponse>, ApiError> {
  let quality = ReviewQuality::from_swipe(request.recalled);
  grade_card(&state, &request.card_id, quality)
    .inspect_err(|e| tracing::warn!("Swipe review failed: {}", e))
    .map(Json)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{CardState, Settings, StudyStats};
  use crate::handlers::test_support::{server, server_with};
  use axum::http::StatusCode;
  use serde_json::json;

  async fn create(server: &axum_test::TestServer, front: &str, groups: &[&str]) -> Card {
    server
      .post("/api/cards")
      .json(&json!({ "front": front, "back": "x", "groups": groups }))
      .await
      .json()
  }

  #[test]
  fn test_parse_groups() {
    assert_eq!(parse_groups(None), GroupFilter::All);
    assert_eq!(parse_groups(Some("")), GroupFilter::All);
    assert_eq!(parse_groups(Some(" , ")), GroupFilter::All);
    assert_eq!(parse_groups(Some("a, b")), GroupFilter::from_ids(["a", "b"]));
  }

  #[test]
  fn test_parse_mode() {
    assert_eq!(parse_mode(None).unwrap(), StudyMode::Normal);
    assert_eq!(parse_mode(Some("intensive")).unwrap(), StudyMode::Intensive);
    assert!(parse_mode(Some("turbo")).is_err());
  }

  #[tokio::test]
  async fn test_due_lists_new_cards() {
    let (server, _) = server();
    create(&server, "uno", &[]).await;
    create(&server, "dos", &[]).await;

    let cards: Vec<Card> = server.get("/api/due").await.json();
    let fronts: Vec<&str> = cards.iter().map(|c| c.front.as_str()).collect();
    assert_eq!(fronts, vec!["uno", "dos"]);
  }

  #[tokio::test]
  async fn test_due_respects_new_cap_and_groups() {
    let settings = Settings {
      new_cards_per_day: 2,
      ..Default::default()
    };
    let (server, _) = server_with(settings);
    for i in 0..4 {
      create(&server, &format!("v{}", i), &["verbs"]).await;
    }
    create(&server, "n0", &["nouns"]).await;

    let capped: Vec<Card> = server.get("/api/due").await.json();
    assert_eq!(capped.len(), 2);

    let all: Vec<Card> = server.get("/api/due").add_query_param("mode", "all").await.json();
    assert_eq!(all.len(), 5);

    let verbs: Vec<Card> = server
      .get("/api/due")
      .add_query_param("mode", "intensive")
      .add_query_param("groups", "verbs")
      .await
      .json();
    assert_eq!(verbs.len(), 4);
    assert!(verbs.iter().all(|c| c.groups == vec!["verbs".to_string()]));

    let limited: Vec<Card> = server
      .get("/api/due")
      .add_query_param("mode", "all")
      .add_query_param("limit", 3)
      .await
      .json();
    assert_eq!(limited.len(), 3);
  }

  #[test]
  fn test_due_query_default_limit_only_for_normal() {
    let params = |mode: &str, limit: Option<usize>| DueParams {
      mode: Some(mode.to_string()),
      limit,
      ..Default::default()
    };

    assert_eq!(
      due_query(&params("normal", None)).unwrap().limit,
      Some(config::DEFAULT_DUE_LIMIT)
    );
    assert_eq!(due_query(&params("all", None)).unwrap().limit, None);
    assert_eq!(due_query(&params("intensive", None)).unwrap().limit, None);
    assert_eq!(due_query(&params("intensive", Some(4))).unwrap().limit, Some(4));
    assert_eq!(due_query(&params("normal", Some(4))).unwrap().limit, Some(4));
  }

  #[tokio::test]
  async fn test_intensive_returns_whole_collection() {
    let total = config::DEFAULT_DUE_LIMIT + 1;
    let (server, state) = server();
    let cards: Vec<Card> = (0..total)
      .map(|i| crate::testing::new_card(&format!("w{}", i)))
      .collect();
    state.store.lock().unwrap().save_cards(cards).unwrap();

    let intensive: Vec<Card> = server
      .get("/api/due")
      .add_query_param("mode", "intensive")
      .await
      .json();
    assert_eq!(intensive.len(), total);

    let all: Vec<Card> = server.get("/api/due").add_query_param("mode", "all").await.json();
    assert_eq!(all.len(), total);

    let normal: Vec<Card> = server.get("/api/due").await.json();
    assert!(normal.len() <= config::DEFAULT_DUE_LIMIT);
  }

  #[tokio::test]
  async fn test_due_unknown_mode() {
    let (server, _) = server();
    server
      .get("/api/due")
      .add_query_param("mode", "turbo")
      .await
      .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
  }

  #[tokio::test]
  async fn test_due_count_ignores_caps() {
    let settings = Settings {
      new_cards_per_day: 1,
      ..Default::default()
    };
    let (server, _) = server_with(settings);
    create(&server, "a", &["g"]).await;
    create(&server, "b", &["g"]).await;
    create(&server, "c", &[]).await;

    let total: CountResponse = server.get("/api/due/count").await.json();
    assert_eq!(total.count, 3);

    let grouped: CountResponse = server
      .get("/api/due/count")
      .add_query_param("groups", "g")
      .await
      .json();
    assert_eq!(grouped.count, 2);
  }

  #[tokio::test]
  async fn test_submit_review_updates_card_and_stats() {
    let (server, state) = server();
    let card = create(&server, "casa", &["home"]).await;

    let response = server
      .post("/api/review")
      .json(&json!({ "cardId": card.id, "quality": 3 }))
      .await;
    response.assert_status_ok();
    let body: ReviewResponse = response.json();
    assert_eq!(body.card.state, CardState::Learning);
    assert_eq!(body.card.repetitions, 1);
    assert!(body.outcome.success);
    assert!(!body.outcome.graduated);

    let stored = state.store.lock().unwrap().get_card(&card.id).unwrap();
    assert_eq!(stored, body.card);

    let stats: StudyStats = server.get("/api/stats").await.json();
    assert_eq!(stats.total_studied, 1);
    assert_eq!(stats.total_correct, 1);
    assert_eq!(stats.streak_days, 1);
    assert_eq!(stats.by_group["home"].studied, 1);
  }

  #[tokio::test]
  async fn test_reviewed_card_leaves_due_set() {
    let (server, _) = server();
    let card = create(&server, "casa", &[]).await;
    server
      .post("/api/review")
      .json(&json!({ "cardId": card.id, "quality": 1 }))
      .await
      .assert_status_ok();

    let count: CountResponse = server.get("/api/due/count").await.json();
    assert_eq!(count.count, 0);
  }

  #[tokio::test]
  async fn test_submit_review_invalid_quality() {
    let (server, _) = server();
    let card = create(&server, "casa", &[]).await;
    let response = server
      .post("/api/review")
      .json(&json!({ "cardId": card.id, "quality": 6 }))
      .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
  }

  #[tokio::test]
  async fn test_submit_review_unknown_card() {
    let (server, _) = server();
    server
      .post("/api/review")
      .json(&json!({ "cardId": "ghost", "quality": 3 }))
      .await
      .assert_status_not_found();
  }

  #[tokio::test]
  async fn test_swipe_review() {
    let (server, _) = server();
    let card = create(&server, "casa", &[]).await;

    let recalled: ReviewResponse = server
      .post("/api/review/swipe")
      .json(&json!({ "cardId": card.id, "recalled": true }))
      .await
      .json();
    assert_eq!(recalled.outcome.quality, ReviewQuality::Perfect);
    assert_eq!(recalled.card.repetitions, 2);

    let forgot: ReviewResponse = server
      .post("/api/review/swipe")
      .json(&json!({ "cardId": card.id, "recalled": false }))
      .await
      .json();
    assert_eq!(forgot.outcome.quality, ReviewQuality::Again);
    assert!(!forgot.outcome.success);
    assert_eq!(forgot.card.repetitions, 0);
  }
}
