pub mod card;
pub mod review;
pub mod settings;
pub mod stats;

pub use card::{Card, CardContent, CardState, INITIAL_EASE, MIN_EASE};
pub use review::{ReviewError, ReviewOutcome, ReviewQuality};
pub use settings::{Settings, SettingsError};
pub use stats::{GroupStats, StudyStats};
