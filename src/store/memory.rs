use std::collections::HashMap;

use crate::domain::{Card, StudyStats};

use super::{CardStore, StoreError};

/// Process-lifetime card collection.
///
/// Keeps insertion order (the selector takes new cards "from the front") and
/// an id index for lookups. Also owns the study statistics for the collection.
#[derive(Debug, Default)]
pub struct MemoryStore {
  cards: Vec<Card>,
  index: HashMap<String, usize>,
  stats: StudyStats,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_cards(cards: Vec<Card>) -> Self {
    let mut store = Self::new();
    for card in cards {
      store.upsert(card);
    }
    store
  }

  /// Borrow the collection without cloning it
  pub fn cards(&self) -> &[Card] {
    &self.cards
  }

  pub fn len(&self) -> usize {
    self.cards.len()
  }

  pub fn is_empty(&self) -> bool {
    self.cards.is_empty()
  }

  pub fn stats(&self) -> &StudyStats {
    &self.stats
  }

  pub fn stats_mut(&mut self) -> &mut StudyStats {
    &mut self.stats
  }

  fn upsert(&mut self, card: Card) {
    match self.index.get(&card.id) {
      Some(&pos) => self.cards[pos] = card,
      None => {
        self.index.insert(card.id.clone(), self.cards.len());
        self.cards.push(card);
      }
    }
  }
}

impl CardStore for MemoryStore {
  fn load_all_cards(&self) -> Result<Vec<Card>, StoreError> {
    Ok(self.cards.clone())
  }

  fn get_card(&self, id: &str) -> Result<Card, StoreError> {
    self
      .index
      .get(id)
      .map(|&pos| self.cards[pos].clone())
      .ok_or_else(|| StoreError::CardNotFound(id.to_string()))
  }

  fn save_card(&mut self, card: Card) -> Result<(), StoreError> {
    self.upsert(card);
    Ok(())
  }
}
