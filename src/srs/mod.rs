pub mod card_selector;
pub mod sm2;

pub use card_selector::{count_due_cards, select_due_cards, DueQuery, GroupFilter, StudyMode};
pub use sm2::{preview_review, process_review, ReviewPreview, MAX_INTERVAL_DAYS};
