use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ease factor assigned to freshly created cards
pub const INITIAL_EASE: f64 = 2.5;

/// Lower bound for the ease factor; no grading sequence may push a card below it
pub const MIN_EASE: f64 = 1.3;

/// Scheduling phase of a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardState {
  New,
  Learning,
  Relearning,
  Review,
  Mastered,
}

impl CardState {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::New => "new",
      Self::Learning => "learning",
      Self::Relearning => "relearning",
      Self::Review => "review",
      Self::Mastered => "mastered",
    }
  }

  /// True for the short-interval phases driven by minute-based steps
  pub fn is_learning_phase(&self) -> bool {
    matches!(self, Self::New | Self::Learning)
  }

  /// True for the day-interval phases (including relearning, which is graded
  /// by the review rules)
  pub fn is_review_phase(&self) -> bool {
    matches!(self, Self::Review | Self::Relearning | Self::Mastered)
  }

  /// Rank used by intensive ordering: new, then learning, then review
  pub fn study_rank(&self) -> u8 {
    match self {
      Self::New => 0,
      Self::Learning | Self::Relearning => 1,
      Self::Review | Self::Mastered => 2,
    }
  }
}

/// Optional content supplied when creating a card
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardContent {
  pub example: Option<String>,
  pub definition: Option<String>,
  pub category: Option<String>,
  #[serde(default)]
  pub groups: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
  pub id: String,
  #[serde(alias = "word")]
  pub front: String,
  #[serde(alias = "translation")]
  pub back: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub example: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub definition: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub category: Option<String>,
  #[serde(default)]
  pub groups: Vec<String>,

  // Scheduling fields, only ever changed by `srs::process_review`
  pub ease_factor: f64,
  pub interval: u32,
  pub repetitions: u32,
  #[serde(with = "chrono::serde::ts_milliseconds")]
  pub due_date: DateTime<Utc>,
  pub lapses: u32,
  pub streak: u32,
  pub state: CardState,
  pub priority: u32,

  #[serde(with = "chrono::serde::ts_milliseconds")]
  pub created_at: DateTime<Utc>,
  #[serde(with = "chrono::serde::ts_milliseconds")]
  pub updated_at: DateTime<Utc>,
}

impl Card {
  pub fn new(front: &str, back: &str, content: CardContent, now: DateTime<Utc>) -> Self {
    Self {
      id: Uuid::new_v4().to_string(),
      front: front.trim().to_string(),
      back: back.trim().to_string(),
      example: trimmed(content.example),
      definition: trimmed(content.definition),
      category: content.category,
      groups: content.groups,
      ease_factor: INITIAL_EASE,
      interval: 0,
      repetitions: 0,
      due_date: now,
      lapses: 0,
      streak: 0,
      state: CardState::New,
      priority: 1,
      created_at: now,
      updated_at: now,
    }
  }

  pub fn is_due(&self, now: DateTime<Utc>) -> bool {
    self.due_date <= now
  }

  /// A leech has failed often enough to be pulled out of study sessions.
  /// It stays in the collection untouched.
  pub fn is_leech(&self, leech_threshold: u32) -> bool {
    self.lapses >= leech_threshold
  }

  pub fn in_any_group<'a, I>(&self, groups: I) -> bool
  where
    I: IntoIterator<Item = &'a String>,
  {
    groups.into_iter().any(|g| self.groups.contains(g))
  }
}

fn trimmed(value: Option<String>) -> Option<String> {
  value
    .map(|s| s.trim().to_string())
    .filter(|s| !s.is_empty())
}
