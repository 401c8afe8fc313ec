//! Finance Dashboard Core
//!
//! Service layer behind a personal-finance dashboard:
//! - Advice responder: keyword-routed templates over the user's figures,
//!   with an optional single bounded call to a remote text generator
//! - Chat session around the advisor with bounded conversation memory
//! - Progression engine: XP, levels, achievements, streaks, challenges
//! - Notification center for progression events
//! - Simulated payment provider behind a trait
//! - Local HTTP API tying a single session together
//!
//! ADVICE FLOW:
//! QUESTION → REMOTE (if configured, one attempt, timeout) → TEMPLATE FALLBACK → RESPONSE

pub mod advisor;
pub mod api;
pub mod chat;
pub mod config;
pub mod error;
pub mod gemini;
pub mod memory;
pub mod models;
pub mod notifications;
pub mod payment;
pub mod progression;

pub use error::{DashboardError, Result};

// Re-export common types
pub use advisor::FinancialAdvisor;
pub use models::*;
pub use progression::{ProgressionEngine, ProgressionEvent};
