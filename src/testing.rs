//! Test utilities for building cards on a fixed clock.
//!
//! Every builder uses `fixed_now()` so scheduling assertions can compare
//! exact timestamps.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::domain::{Card, CardContent, CardState};

/// Reference instant shared by all tests.
pub fn fixed_now() -> DateTime<Utc> {
  Utc
    .with_ymd_and_hms(2026, 3, 2, 12, 0, 0)
    .single()
    .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// A brand-new card due at `fixed_now()`.
pub fn new_card(front: &str) -> Card {
  Card::new(front, &format!("{} (back)", front), CardContent::default(), fixed_now())
}

/// A new card belonging to the given groups.
pub fn grouped_card(front: &str, groups: &[&str]) -> Card {
  let content = CardContent {
    groups: groups.iter().map(|g| g.to_string()).collect(),
    ..Default::default()
  };
  Card::new(front, &format!("{} (back)", front), content, fixed_now())
}

/// A card in the review phase with the given interval and ease.
pub fn review_card(front: &str, interval: u32, ease_factor: f64) -> Card {
  let mut card = new_card(front);
  card.state = CardState::Review;
  card.interval = interval;
  card.ease_factor = ease_factor;
  card.repetitions = 1;
  card
}

/// Shift a card's due date relative to `fixed_now()`, in minutes.
pub fn due_in(mut card: Card, minutes: i64) -> Card {
  card.due_date = fixed_now() + Duration::minutes(minutes);
  card
}

/// Same card with a different state.
pub fn with_state(mut card: Card, state: CardState) -> Card {
  card.state = state;
  card
}
