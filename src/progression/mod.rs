//! Gamification: levels, achievements, streaks, challenges and badges

pub mod engine;
pub mod model;
pub mod seed;

pub use engine::{level_title, ProgressionEngine, ProgressionEvent, ProgressionSummary, XpAward};
pub use model::*;
pub use seed::seed_stats;
