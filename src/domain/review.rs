use serde::{Deserialize, Serialize};

use super::card::{Card, CardState};

/// Review grade on the 1-5 scale.
///
/// Two calling conventions feed this type: the classic five-button scale and
/// the binary swipe gesture, which only ever emits `Again` or `Perfect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ReviewQuality {
  Again = 1,
  Hard = 2,
  Good = 3,
  Easy = 4,
  Perfect = 5,
}

impl ReviewQuality {
  pub const ALL: [ReviewQuality; 5] = [
    Self::Again,
    Self::Hard,
    Self::Good,
    Self::Easy,
    Self::Perfect,
  ];

  pub fn from_u8(value: u8) -> Option<Self> {
    match value {
      1 => Some(Self::Again),
      2 => Some(Self::Hard),
      3 => Some(Self::Good),
      4 => Some(Self::Easy),
      5 => Some(Self::Perfect),
      _ => None,
    }
  }

  /// Swipe mode: right = recalled (Perfect), left = forgot (Again)
  pub fn from_swipe(recalled: bool) -> Self {
    if recalled { Self::Perfect } else { Self::Again }
  }

  pub fn as_u8(&self) -> u8 {
    *self as u8
  }

  pub fn is_success(&self) -> bool {
    *self >= Self::Good
  }
}

/// Error for grades outside 1-5.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewError {
  InvalidQuality(u8),
}

impl std::fmt::Display for ReviewError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ReviewError::InvalidQuality(q) => write!(f, "review quality must be 1-5, got {}", q),
    }
  }
}

impl std::error::Error for ReviewError {}

impl TryFrom<u8> for ReviewQuality {
  type Error = ReviewError;

  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Self::from_u8(value).ok_or(ReviewError::InvalidQuality(value))
  }
}

impl From<ReviewQuality> for u8 {
  fn from(q: ReviewQuality) -> u8 {
    q.as_u8()
  }
}

/// What a single grading did to a card, for statistics and notifications.
/// The scheduler itself never broadcasts anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
  pub quality: ReviewQuality,
  pub success: bool,
  /// A review-phase card fell back into learning
  pub lapsed: bool,
  /// The card left the learning phase
  pub graduated: bool,
  pub newly_mastered: bool,
}

impl ReviewOutcome {
  pub fn from_transition(before: &Card, after: &Card, quality: ReviewQuality) -> Self {
    Self {
      quality,
      success: quality.is_success(),
      lapsed: before.state.is_review_phase() && after.state == CardState::Learning,
      graduated: before.state.is_learning_phase() && after.state.is_review_phase(),
      newly_mastered: before.state != CardState::Mastered && after.state == CardState::Mastered,
    }
  }
}
