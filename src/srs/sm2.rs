//! Review state machine.
//!
//! SM-2 style scheduling with Anki-like learning steps:
//! - new/learning cards walk through minute-based `learn_steps`
//! - once the steps are exhausted the card graduates to day intervals
//! - review/relearning/mastered cards grow their interval by the ease factor
//! - a failed review sends the card back to the first learning steps
//!
//! Quality: 1=Again, 2=Hard, 3=Good, 4=Easy, 5=Perfect

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::domain::{Card, CardState, INITIAL_EASE, MIN_EASE, ReviewQuality, Settings};

/// Upper bound on day intervals (100 years)
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

/// Interval multiplier applied on top of the ease factor for a Perfect grade
const PERFECT_MULTIPLIER: f64 = 1.3;

/// Interval multiplier applied on top of the ease factor for a Good grade
const GOOD_MULTIPLIER: f64 = 0.8;

fn ease_bonus(quality: ReviewQuality) -> f64 {
  match quality {
    ReviewQuality::Easy => 0.1,
    ReviewQuality::Perfect => 0.2,
    _ => 0.0,
  }
}

fn ease_penalty(quality: ReviewQuality) -> f64 {
  match quality {
    ReviewQuality::Again => 0.2,
    _ => 0.15,
  }
}

fn interval_multiplier(quality: ReviewQuality) -> f64 {
  match quality {
    ReviewQuality::Perfect => PERFECT_MULTIPLIER,
    ReviewQuality::Good => GOOD_MULTIPLIER,
    _ => 1.0,
  }
}

/// Delay for a failed grade: first step for Again, second step for Hard.
/// With a single configured step, Hard waits twice as long as Again.
fn retry_step_minutes(quality: ReviewQuality, steps: &[f64]) -> f64 {
  let first = steps.first().copied().unwrap_or(crate::domain::settings::FALLBACK_STEP_MINUTES);
  match quality {
    ReviewQuality::Again => first,
    _ => steps.get(1).copied().unwrap_or(first * 2.0),
  }
}

fn after_minutes(now: DateTime<Utc>, minutes: f64) -> DateTime<Utc> {
  let delta = Duration::try_milliseconds((minutes * 60_000.0) as i64).unwrap_or(Duration::MAX);
  now.checked_add_signed(delta).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn after_days(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
  now
    .checked_add_signed(Duration::days(i64::from(days)))
    .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn sanitize_ease(ease: f64) -> f64 {
  if ease.is_finite() {
    ease.max(MIN_EASE)
  } else {
    INITIAL_EASE
  }
}

fn promoted_state(interval: u32, settings: &Settings) -> CardState {
  if interval >= settings.mastered_interval {
    CardState::Mastered
  } else {
    CardState::Review
  }
}

/// Grade a card and return its next scheduling state.
///
/// Pure: `now` is the only clock, and the input card is left untouched.
/// Settings are sanitized first, so malformed settings (empty steps, zero
/// intervals) fall back to safe defaults instead of panicking.
pub fn process_review(
  card: &Card,
  quality: ReviewQuality,
  settings: &Settings,
  now: DateTime<Utc>,
) -> Card {
  let settings = settings.sanitized();
  let mut updated = card.clone();
  updated.updated_at = now;
  updated.ease_factor = sanitize_ease(card.ease_factor);

  if card.state.is_learning_phase() {
    apply_learning(&mut updated, quality, &settings, now);
  } else {
    apply_review(&mut updated, quality, &settings, now);
  }

  tracing::trace!(
    card_id = %card.id,
    quality = quality.as_u8(),
    from = card.state.as_str(),
    to = updated.state.as_str(),
    interval = updated.interval,
    "Card reviewed"
  );

  updated
}

/// new/learning: minute-based steps until graduation
fn apply_learning(card: &mut Card, quality: ReviewQuality, settings: &Settings, now: DateTime<Utc>) {
  let steps = &settings.learn_steps;

  if !quality.is_success() {
    card.state = CardState::Learning;
    card.interval = 0;
    card.repetitions = 0;
    card.due_date = after_minutes(now, retry_step_minutes(quality, steps));
    return;
  }

  // Perfect skips an extra step
  let advance = if quality == ReviewQuality::Perfect { 2 } else { 1 };
  card.repetitions = card.repetitions.saturating_add(advance);

  if card.repetitions as usize >= steps.len() {
    let days = if quality == ReviewQuality::Perfect {
      settings.easy_interval
    } else {
      settings.graduating_interval
    };
    card.interval = days.clamp(1, MAX_INTERVAL_DAYS);
    card.state = promoted_state(card.interval, settings);
    card.due_date = after_days(now, card.interval);
  } else {
    let index = (card.repetitions as usize).min(steps.len() - 1);
    card.state = CardState::Learning;
    card.interval = 0;
    card.due_date = after_minutes(now, steps[index]);
  }
}

/// review/relearning/mastered: ease-driven day intervals, lapse on failure
fn apply_review(card: &mut Card, quality: ReviewQuality, settings: &Settings, now: DateTime<Utc>) {
  if !quality.is_success() {
    // Only Again counts as a lapse; Hard demotes without marking the card
    if quality == ReviewQuality::Again {
      card.lapses = card.lapses.saturating_add(1);
    }
    card.ease_factor = (card.ease_factor - ease_penalty(quality)).max(MIN_EASE);
    card.state = CardState::Learning;
    card.interval = 0;
    card.repetitions = 0;
    card.streak = 0;
    card.due_date = after_minutes(now, retry_step_minutes(quality, &settings.learn_steps));
    return;
  }

  card.ease_factor = (card.ease_factor + ease_bonus(quality)).max(MIN_EASE);
  card.repetitions = card.repetitions.saturating_add(1);
  card.streak = card.streak.saturating_add(1);

  let previous = if card.interval > 0 {
    card.interval
  } else {
    settings.new_interval
  };
  let next = (f64::from(previous) * card.ease_factor * interval_multiplier(quality))
    .max(1.0)
    .round()
    .min(f64::from(MAX_INTERVAL_DAYS));

  card.interval = next as u32;
  card.state = promoted_state(card.interval, settings);
  card.due_date = after_days(now, card.interval);
}

/// Hypothetical result of one grade, shown on the answer buttons
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPreview {
  pub quality: ReviewQuality,
  pub state: CardState,
  pub interval: u32,
  #[serde(with = "chrono::serde::ts_milliseconds")]
  pub due_date: DateTime<Utc>,
}

/// Preview every grade for a card, ordered Again..Perfect
pub fn preview_review(card: &Card, settings: &Settings, now: DateTime<Utc>) -> [ReviewPreview; 5] {
  ReviewQuality::ALL.map(|quality| {
    let next = process_review(card, quality, settings, now);
    ReviewPreview {
      quality,
      state: next.state,
      interval: next.interval,
      due_date: next.due_date,
    }
  })
}
