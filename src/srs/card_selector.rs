//! Due-set selection for study sessions.
//!
//! Decides which cards a session shows and in what order:
//! - leeches are never shown
//! - an optional group filter narrows the collection
//! - `Normal` mode honours the daily new/review caps and only serves due cards
//! - `AllDue` mode serves every due card, caps bypassed
//! - `Intensive` mode serves the whole filtered set, due cards first
//!
//! All sorts are stable, so ties keep collection order and the same input
//! always yields the same sequence.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use crate::domain::{Card, CardState, Settings};

/// Which cards qualify by group membership
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GroupFilter {
  #[default]
  All,
  Groups(BTreeSet<String>),
}

impl GroupFilter {
  /// An empty list means no filter
  pub fn from_ids<I, S>(ids: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let set: BTreeSet<String> = ids.into_iter().map(Into::into).collect();
    if set.is_empty() {
      Self::All
    } else {
      Self::Groups(set)
    }
  }

  pub fn matches(&self, card: &Card) -> bool {
    match self {
      Self::All => true,
      Self::Groups(set) => card.in_any_group(set),
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StudyMode {
  /// Daily caps, due cards only
  #[default]
  Normal,
  /// "Study all due": caps bypassed, due cards only
  AllDue,
  /// Everything in the filter, due first, no caps
  Intensive,
}

impl StudyMode {
  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "normal" => Some(Self::Normal),
      "all" | "all_due" => Some(Self::AllDue),
      "intensive" => Some(Self::Intensive),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Normal => "normal",
      Self::AllDue => "all_due",
      Self::Intensive => "intensive",
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DueQuery {
  pub groups: GroupFilter,
  pub mode: StudyMode,
  /// Overall cap on the session size
  pub limit: Option<usize>,
}

impl DueQuery {
  pub fn new(mode: StudyMode) -> Self {
    Self {
      mode,
      ..Default::default()
    }
  }

  pub fn with_groups(mut self, groups: GroupFilter) -> Self {
    self.groups = groups;
    self
  }

  pub fn with_limit(mut self, limit: usize) -> Self {
    self.limit = Some(limit);
    self
  }
}

/// Leech exclusion plus group filter, shared by every selection path
fn is_candidate(card: &Card, groups: &GroupFilter, leech_threshold: u32) -> bool {
  !card.is_leech(leech_threshold) && groups.matches(card)
}

/// Select the cards to study now, in presentation order.
pub fn select_due_cards<'a>(
  cards: &'a [Card],
  query: &DueQuery,
  settings: &Settings,
  now: DateTime<Utc>,
) -> Vec<&'a Card> {
  let leech_threshold = settings.sanitized().leech_threshold;
  let candidates = cards
    .iter()
    .filter(|c| is_candidate(c, &query.groups, leech_threshold));

  let selected = match query.mode {
    StudyMode::Normal => select_normal(candidates, settings, query.limit, now),
    StudyMode::AllDue => {
      let mut due: Vec<&Card> = candidates.filter(|c| c.is_due(now)).collect();
      due.sort_by_key(|c| c.due_date);
      truncate(due, query.limit)
    }
    StudyMode::Intensive => {
      let mut all: Vec<&Card> = candidates.collect();
      all.sort_by_key(|c| intensive_key(c, now));
      truncate(all, query.limit)
    }
  };

  tracing::debug!(
    mode = query.mode.as_str(),
    total = cards.len(),
    selected = selected.len(),
    "Selected due cards"
  );

  selected
}

fn select_normal<'a>(
  candidates: impl Iterator<Item = &'a Card>,
  settings: &Settings,
  limit: Option<usize>,
  now: DateTime<Utc>,
) -> Vec<&'a Card> {
  let (new_cards, review_cards): (Vec<&Card>, Vec<&Card>) = candidates
    .filter(|c| c.is_due(now))
    .partition(|c| c.state == CardState::New);

  let budget = limit.unwrap_or(usize::MAX);
  let new_take = settings.new_cards_per_day.min(new_cards.len()).min(budget);
  let review_take = settings
    .review_cards_per_day
    .min(review_cards.len())
    .min(budget - new_take);

  let mut selected: Vec<&Card> = new_cards
    .into_iter()
    .take(new_take)
    .chain(review_cards.into_iter().take(review_take))
    .collect();
  selected.sort_by_key(|c| c.due_date);
  selected
}

/// Due before not-due, then new < learning < review, then earliest due
fn intensive_key(card: &Card, now: DateTime<Utc>) -> (bool, u8, DateTime<Utc>) {
  (!card.is_due(now), card.state.study_rank(), card.due_date)
}

fn truncate(mut cards: Vec<&Card>, limit: Option<usize>) -> Vec<&Card> {
  if let Some(limit) = limit {
    cards.truncate(limit);
  }
  cards
}

/// Number of cards eligible for study right now.
///
/// Applies the same leech, group and due filters as `select_due_cards` in
/// normal mode but no daily caps: it answers "how many are due", not "how
/// many would a session show".
pub fn count_due_cards(
  cards: &[Card],
  groups: &GroupFilter,
  settings: &Settings,
  now: DateTime<Utc>,
) -> usize {
  let leech_threshold = settings.sanitized().leech_threshold;
  cards
    .iter()
    .filter(|c| is_candidate(c, groups, leech_threshold) && c.is_due(now))
    .count()
}
