//! Scheduler settings.
//!
//! Settings arrive from an external collaborator (the config file or the
//! client's stored preferences) and are treated as an immutable snapshot for
//! each call into the scheduler.

use serde::{Deserialize, Serialize};

/// Normal learning steps in minutes: 1min → 10min → 1hr → 5hr
pub const DEFAULT_LEARN_STEPS: [f64; 4] = [1.0, 10.0, 60.0, 300.0];

/// Relearning steps in minutes
pub const DEFAULT_LAPSE_STEPS: [f64; 2] = [10.0, 60.0];

/// Single step used when the configured learning steps are unusable
pub const FALLBACK_STEP_MINUTES: f64 = 10.0;

pub const DEFAULT_LEECH_THRESHOLD: u32 = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
  pub new_cards_per_day: usize,
  pub review_cards_per_day: usize,
  pub learn_steps: Vec<f64>,
  /// Accepted and validated for stored-settings compatibility; lapsed
  /// cards restart on `learn_steps`
  pub lapse_steps: Vec<f64>,
  pub graduating_interval: u32,
  pub easy_interval: u32,
  pub new_interval: u32,
  pub mastered_interval: u32,
  pub leech_threshold: u32,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      new_cards_per_day: 50,
      review_cards_per_day: 200,
      learn_steps: DEFAULT_LEARN_STEPS.to_vec(),
      lapse_steps: DEFAULT_LAPSE_STEPS.to_vec(),
      graduating_interval: 1,
      easy_interval: 4,
      new_interval: 1,
      mastered_interval: 14,
      leech_threshold: DEFAULT_LEECH_THRESHOLD,
    }
  }
}

/// Settings validation errors.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsError {
  EmptyLearnSteps,
  InvalidStep { field: &'static str, value: f64 },
  ZeroValue(&'static str),
}

impl std::fmt::Display for SettingsError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      SettingsError::EmptyLearnSteps => write!(f, "learnSteps must contain at least one step"),
      SettingsError::InvalidStep { field, value } => {
        write!(f, "{} contains an invalid step: {}", field, value)
      }
      SettingsError::ZeroValue(field) => write!(f, "{} must be greater than zero", field),
    }
  }
}

impl std::error::Error for SettingsError {}

fn is_valid_step(minutes: f64) -> bool {
  minutes.is_finite() && minutes > 0.0
}

impl Settings {
  /// Fail-fast check used at the configuration boundary.
  pub fn validate(&self) -> Result<(), SettingsError> {
    if self.learn_steps.is_empty() {
      return Err(SettingsError::EmptyLearnSteps);
    }
    for (field, steps) in [("learnSteps", &self.learn_steps), ("lapseSteps", &self.lapse_steps)] {
      if let Some(&value) = steps.iter().find(|&&m| !is_valid_step(m)) {
        return Err(SettingsError::InvalidStep { field, value });
      }
    }

    let day_values = [
      ("graduatingInterval", self.graduating_interval),
      ("easyInterval", self.easy_interval),
      ("newInterval", self.new_interval),
      ("masteredInterval", self.mastered_interval),
      ("leechThreshold", self.leech_threshold),
    ];
    if let Some((field, _)) = day_values.iter().find(|(_, v)| *v == 0) {
      return Err(SettingsError::ZeroValue(*field));
    }

    Ok(())
  }

  /// Copy of these settings with every invalid value replaced:
  /// - non-finite or non-positive steps are dropped
  /// - an empty learning step list becomes a single `FALLBACK_STEP_MINUTES` step
  /// - zero day values become 1, a zero leech threshold becomes the default
  pub fn sanitized(&self) -> Settings {
    let mut learn_steps: Vec<f64> = self
      .learn_steps
      .iter()
      .copied()
      .filter(|&m| is_valid_step(m))
      .collect();
    if learn_steps.is_empty() {
      learn_steps.push(FALLBACK_STEP_MINUTES);
    }

    Settings {
      new_cards_per_day: self.new_cards_per_day,
      review_cards_per_day: self.review_cards_per_day,
      learn_steps,
      lapse_steps: self.lapse_steps.iter().copied().filter(|&m| is_valid_step(m)).collect(),
      graduating_interval: self.graduating_interval.max(1),
      easy_interval: self.easy_interval.max(1),
      new_interval: self.new_interval.max(1),
      mastered_interval: self.mastered_interval.max(1),
      leech_threshold: if self.leech_threshold == 0 {
        DEFAULT_LEECH_THRESHOLD
      } else {
        self.leech_threshold
      },
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults_are_valid() {
    assert_eq!(Settings::default().validate(), Ok(()));
  }

  #[test]
  fn test_default_values() {
    let s = Settings::default();
    assert_eq!(s.new_cards_per_day, 50);
    assert_eq!(s.review_cards_per_day, 200);
    assert_eq!(s.learn_steps, vec![1.0, 10.0, 60.0, 300.0]);
    assert_eq!(s.lapse_steps, vec![10.0, 60.0]);
    assert_eq!(s.mastered_interval, 14);
    assert_eq!(s.leech_threshold, 8);
  }

  #[test]
  fn test_validate_empty_learn_steps() {
    let s = Settings {
      learn_steps: vec![],
      ..Default::default()
    };
    assert_eq!(s.validate(), Err(SettingsError::EmptyLearnSteps));
  }

  #[test]
  fn test_validate_negative_step() {
    let s = Settings {
      learn_steps: vec![1.0, -5.0],
      ..Default::default()
    };
    assert_eq!(
      s.validate(),
      Err(SettingsError::InvalidStep { field: "learnSteps", value: -5.0 })
    );
  }

  #[test]
  fn test_validate_nan_lapse_step() {
    let s = Settings {
      lapse_steps: vec![f64::NAN],
      ..Default::default()
    };
    assert!(matches!(
      s.validate(),
      Err(SettingsError::InvalidStep { field: "lapseSteps", .. })
    ));
  }

  #[test]
  fn test_validate_zero_day_value() {
    let s = Settings {
      mastered_interval: 0,
      ..Default::default()
    };
    assert_eq!(s.validate(), Err(SettingsError::ZeroValue("masteredInterval")));
  }

  #[test]
  fn test_sanitized_empty_steps_fallback() {
    let s = Settings {
      learn_steps: vec![],
      ..Default::default()
    };
    assert_eq!(s.sanitized().learn_steps, vec![FALLBACK_STEP_MINUTES]);
  }

  #[test]
  fn test_sanitized_drops_bad_steps() {
    let s = Settings {
      learn_steps: vec![f64::INFINITY, 0.0, 5.0, f64::NAN, 20.0],
      ..Default::default()
    };
    assert_eq!(s.sanitized().learn_steps, vec![5.0, 20.0]);
  }

  #[test]
  fn test_sanitized_zero_values() {
    let s = Settings {
      graduating_interval: 0,
      easy_interval: 0,
      new_interval: 0,
      mastered_interval: 0,
      leech_threshold: 0,
      ..Default::default()
    };
    let clean = s.sanitized();
    assert_eq!(clean.graduating_interval, 1);
    assert_eq!(clean.easy_interval, 1);
    assert_eq!(clean.new_interval, 1);
    assert_eq!(clean.mastered_interval, 1);
    assert_eq!(clean.leech_threshold, DEFAULT_LEECH_THRESHOLD);
    assert_eq!(clean.validate(), Ok(()));
  }

  #[test]
  fn test_sanitized_keeps_valid_settings() {
    let s = Settings::default();
    assert_eq!(s.sanitized(), s);
  }

  #[test]
  fn test_partial_json_uses_defaults() {
    let s: Settings = serde_json::from_str(r#"{"learnSteps": [1, 10], "newCardsPerDay": 5}"#).unwrap();
    assert_eq!(s.learn_steps, vec![1.0, 10.0]);
    assert_eq!(s.new_cards_per_day, 5);
    assert_eq!(s.review_cards_per_day, 200);
    assert_eq!(s.graduating_interval, 1);
  }

  #[test]
  fn test_negative_value_rejected_by_serde() {
    let result: Result<Settings, _> = serde_json::from_str(r#"{"easyInterval": -3}"#);
    assert!(result.is_err());
  }
}
