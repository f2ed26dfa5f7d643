//! Card storage collaborator.
//!
//! The scheduler never touches storage; callers load a snapshot through
//! `CardStore`, run the scheduler, and write the returned cards back.

pub mod memory;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::Card;

pub use memory::MemoryStore;

pub type StorePool = Arc<Mutex<MemoryStore>>;

/// Persistence interface consumed by the study flow
pub trait CardStore {
  /// Every card, in insertion order
  fn load_all_cards(&self) -> Result<Vec<Card>, StoreError>;

  fn get_card(&self, id: &str) -> Result<Card, StoreError>;

  /// Insert or replace a card by id
  fn save_card(&mut self, card: Card) -> Result<(), StoreError>;

  fn save_cards(&mut self, cards: Vec<Card>) -> Result<(), StoreError> {
    for card in cards {
      self.save_card(card)?;
    }
    Ok(())
  }
}

/// Store errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
  CardNotFound(String),
  /// The store lock was poisoned by a panicking writer
  Unavailable,
}

impl std::fmt::Display for StoreError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      StoreError::CardNotFound(id) => write!(f, "Card not found: {}", id),
      StoreError::Unavailable => write!(f, "Card store unavailable"),
    }
  }
}

impl std::error::Error for StoreError {}

/// Extension trait for logging errors before discarding them
pub trait LogOnError<T> {
  /// Log the error at warn level and return None
  fn log_warn(self, context: &str) -> Option<T>;
}

impl<T, E: std::fmt::Display> LogOnError<T> for Result<T, E> {
  fn log_warn(self, context: &str) -> Option<T> {
    match self {
      Ok(v) => Some(v),
      Err(e) => {
        tracing::warn!("{}: {}", context, e);
        None
      }
    }
  }
}

pub fn new_pool(store: MemoryStore) -> StorePool {
  Arc::new(Mutex::new(store))
}

/// Try to acquire the store lock, returning an error if poisoned
pub fn try_lock(pool: &StorePool) -> Result<MutexGuard<'_, MemoryStore>, StoreError> {
  pool.lock().map_err(|_: PoisonError<_>| {
    tracing::error!("Card store mutex poisoned - a thread panicked while holding the lock");
    StoreError::Unavailable
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::new_card;

  #[test]
  fn test_log_warn_ok_passes_through() {
    let ok: Result<i32, StoreError> = Ok(3);
    assert_eq!(ok.log_warn("ctx"), Some(3));
  }

  #[test]
  fn test_log_warn_err_discards() {
    let err: Result<i32, StoreError> = Err(StoreError::Unavailable);
    assert_eq!(err.log_warn("ctx"), None);
    let err: Result<Vec<Card>, StoreError> = Err(StoreError::CardNotFound("x".into()));
    assert!(err.log_warn("ctx").is_none());
  }

  #[test]
  fn test_try_lock_poisoned() {
    let pool = new_pool(MemoryStore::new());
    let clone = pool.clone();
    let _ = std::thread::spawn(move || {
      let _guard = clone.lock().unwrap();
      panic!("poison the lock");
    })
    .join();

    assert!(matches!(try_lock(&pool), Err(StoreError::Unavailable)));
  }

  #[test]
  fn test_default_save_cards() {
    let mut store = MemoryStore::new();
    store.save_cards(vec![new_card("a"), new_card("b")]).unwrap();
    assert_eq!(store.load_all_cards().unwrap().len(), 2);
  }

  #[test]
  fn test_store_error_display() {
    assert_eq!(StoreError::CardNotFound("abc".into()).to_string(), "Card not found: abc");
    assert_eq!(StoreError::Unavailable.to_string(), "Card store unavailable");
  }
}
