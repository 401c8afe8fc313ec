//! Notification center
//!
//! Short-lived announcements for progression events. Each notification stays
//! visible for a fixed lifetime unless dismissed first. Callers pass the
//! current time in, so expiry is deterministic.

use crate::progression::ProgressionEvent;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

const DEFAULT_LIFETIME_SECS: i64 = 5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    pub event: ProgressionEvent,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Notification {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

pub struct NotificationCenter {
    lifetime: Duration,
    notifications: Vec<Notification>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::with_lifetime(Duration::seconds(DEFAULT_LIFETIME_SECS))
    }

    pub fn with_lifetime(lifetime: Duration) -> Self {
        Self {
            lifetime,
            notifications: Vec::new(),
        }
    }

    /// Queue an announcement for `event`
    pub fn push(&mut self, event: ProgressionEvent, now: DateTime<Utc>) -> Uuid {
        let (title, message) = describe(&event);
        let id = Uuid::new_v4();

        debug!(%id, %title, "Notification queued");

        self.notifications.push(Notification {
            id,
            title,
            message,
            event,
            created_at: now,
            expires_at: now + self.lifetime,
        });
        id
    }

    pub fn push_all(
        &mut self,
        events: impl IntoIterator<Item = ProgressionEvent>,
        now: DateTime<Utc>,
    ) -> Vec<Uuid> {
        events.into_iter().map(|e| self.push(e, now)).collect()
    }

    /// Notifications still on screen at `now`, oldest first
    pub fn visible(&self, now: DateTime<Utc>) -> Vec<&Notification> {
        self.notifications
            .iter()
            .filter(|n| !n.is_expired(now))
            .collect()
    }

    /// Drop expired notifications, returning how many were removed
    pub fn prune(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.notifications.len();
        self.notifications.retain(|n| !n.is_expired(now));
        before - self.notifications.len()
    }

    pub fn dismiss(&mut self, id: Uuid) -> bool {
        let before = self.notifications.len();
        self.notifications.retain(|n| n.id != id);
        before != self.notifications.len()
    }

    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

fn describe(event: &ProgressionEvent) -> (String, String) {
    match event {
        ProgressionEvent::LevelUp { level, title } => (
            "Level Up!".to_string(),
            format!("You reached level {}: {}", level, title),
        ),
        ProgressionEvent::AchievementUnlocked {
            title,
            points,
            rarity,
            ..
        } => (
            "Achievement Unlocked!".to_string(),
            format!("{} ({}, +{} XP)", title, rarity, points),
        ),
        ProgressionEvent::ChallengeCompleted { title, xp, .. } => (
            "Challenge Complete!".to_string(),
            format!("{} (+{} XP)", title, xp),
        ),
    }
}
