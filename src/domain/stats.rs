//! Study statistics.
//!
//! Updated by the caller after each grading; the scheduler never touches it.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupStats {
  pub studied: u64,
  pub correct: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyStats {
  pub total_studied: u64,
  pub total_correct: u64,
  /// Consecutive UTC calendar days with at least one review
  pub streak_days: u32,
  #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
  pub last_study_date: Option<DateTime<Utc>>,
  #[serde(default)]
  pub by_group: BTreeMap<String, GroupStats>,
}

impl StudyStats {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn record_review(&mut self, correct: bool, groups: &[String], now: DateTime<Utc>) {
    self.total_studied += 1;
    if correct {
      self.total_correct += 1;
    }

    let today = now.date_naive();
    self.streak_days = match self.last_study_date.map(|d| d.date_naive()) {
      Some(last) if last == today => self.streak_days.max(1),
      Some(last) if last.succ_opt() == Some(today) => self.streak_days + 1,
      _ => 1,
    };
    self.last_study_date = Some(now);

    for group in groups {
      let entry = self.by_group.entry(group.clone()).or_default();
      entry.studied += 1;
      if correct {
        entry.correct += 1;
      }
    }
  }

  pub fn accuracy(&self) -> f64 {
    if self.total_studied == 0 {
      0.0
    } else {
      self.total_correct as f64 / self.total_studied as f64
    }
  }
}
