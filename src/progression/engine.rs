//! Progression engine
//!
//! Owns the session's `GamificationStats` and applies every XP-bearing
//! transition. Unknown ids are ignored rather than reported: a missed
//! progression event must never take the session down.
//!
//! Level-ups are single-step: one `add_xp` call raises the level by at most
//! one, even when the award would cover several thresholds.

use crate::progression::model::{
    Achievement, Badge, Challenge, Difficulty, GamificationStats, Rarity, Streak,
};
use crate::progression::seed::seed_stats;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, info, warn};

/// Size of the recent-awards log
const MAX_RECENT_AWARDS: usize = 50;
const RECENT_ACHIEVEMENTS: usize = 3;

/// Something the presentation layer should announce
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressionEvent {
    LevelUp {
        level: u32,
        title: String,
    },
    AchievementUnlocked {
        id: String,
        title: String,
        points: u64,
        rarity: Rarity,
    },
    ChallengeCompleted {
        id: String,
        title: String,
        xp: u64,
    },
}

/// One applied XP award
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct XpAward {
    pub amount: u64,
    pub reason: String,
    pub awarded_at: DateTime<Utc>,
    pub leveled_up: bool,
}

/// Stats plus the derived views, as handed to the UI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressionSummary {
    pub stats: GamificationStats,
    pub progress_to_next_level: f64,
    pub active_streaks: Vec<Streak>,
    pub active_challenges: Vec<Challenge>,
    pub recent_achievements: Vec<Achievement>,
    /// Newest first
    pub recent_awards: Vec<XpAward>,
}

pub struct ProgressionEngine {
    stats: GamificationStats,
    events: Vec<ProgressionEvent>,
    recent_awards: VecDeque<XpAward>,
}

impl ProgressionEngine {
    /// Engine starting from the session seed
    pub fn new() -> Self {
        Self::from_stats(seed_stats(Utc::now()))
    }

    pub fn from_stats(stats: GamificationStats) -> Self {
        Self {
            stats,
            events: Vec::new(),
            recent_awards: VecDeque::with_capacity(MAX_RECENT_AWARDS),
        }
    }

    pub fn stats(&self) -> &GamificationStats {
        &self.stats
    }

    // =============================
    // XP & Levels
    // =============================

    /// Award XP. Zero or negative amounts are rejected and change nothing.
    pub fn add_xp(&mut self, amount: i64, reason: &str) -> Option<XpAward> {
        match u64::try_from(amount) {
            Ok(amount) if amount > 0 => Some(self.award(amount, reason)),
            _ => {
                warn!(amount, reason, "Ignoring non-positive XP award");
                None
            }
        }
    }

    fn award(&mut self, amount: u64, reason: &str) -> XpAward {
        let stats = &mut self.stats;
        stats.total_xp = stats.total_xp.saturating_add(amount);
        stats.weekly_xp = stats.weekly_xp.saturating_add(amount);
        stats.monthly_xp = stats.monthly_xp.saturating_add(amount);
        stats.next_milestone.progress = stats.total_xp;

        let level = &mut stats.level;
        level.total_xp = stats.total_xp;
        level.current_xp = level.current_xp.saturating_add(amount);

        let leveled_up = level.current_xp >= level.xp_to_next;
        if leveled_up {
            level.current_xp -= level.xp_to_next;
            level.level += 1;
            level.xp_to_next = next_threshold(level.xp_to_next);
            level.title = level_title(level.level).to_string();

            info!(
                level = level.level,
                title = %level.title,
                xp_to_next = level.xp_to_next,
                "Level up"
            );

            self.events.push(ProgressionEvent::LevelUp {
                level: level.level,
                title: level.title.clone(),
            });
        }

        debug!(amount, reason, total_xp = stats.total_xp, "XP awarded");

        let award = XpAward {
            amount,
            reason: reason.to_string(),
            awarded_at: Utc::now(),
            leveled_up,
        };

        if self.recent_awards.len() == MAX_RECENT_AWARDS {
            self.recent_awards.pop_front();
        }
        self.recent_awards.push_back(award.clone());

        award
    }

    // =============================
    // Achievements
    // =============================

    /// Unlock an achievement and award its points. Returns `false` when
    /// the id is unknown or the achievement was already unlocked.
    pub fn unlock_achievement(&mut self, id: &str) -> bool {
        let Some(achievement) = self.stats.achievements.iter_mut().find(|a| a.id == id) else {
            debug!(id, "Unknown achievement");
            return false;
        };

        if achievement.unlocked {
            return false;
        }

        achievement.unlocked = true;
        achievement.unlocked_at = Some(Utc::now());
        achievement.progress = achievement.progress.max(achievement.max_progress);

        let points = achievement.points;
        let title = achievement.title.clone();

        info!(id, %title, points, "Achievement unlocked");
        self.events.push(ProgressionEvent::AchievementUnlocked {
            id: id.to_string(),
            title: title.clone(),
            points,
            rarity: achievement.rarity,
        });

        if points > 0 {
            self.award(points, &format!("Achievement: {}", title));
        }
        true
    }

    /// Record progress towards an achievement, unlocking it at the target
    pub fn update_achievement_progress(&mut self, id: &str, progress: i64) -> bool {
        let Some(achievement) = self.stats.achievements.iter_mut().find(|a| a.id == id) else {
            debug!(id, "Unknown achievement");
            return false;
        };

        if achievement.unlocked {
            return false;
        }

        achievement.progress = clamp_progress(progress, achievement.max_progress);
        if achievement.progress >= achievement.max_progress {
            return self.unlock_achievement(id);
        }
        true
    }

    // =============================
    // Streaks
    // =============================

    /// Extend (`increment = true`) or break a streak
    pub fn update_streak(&mut self, id: &str, increment: bool) -> bool {
        let Some(streak) = self.stats.streaks.iter_mut().find(|s| s.id == id) else {
            debug!(id, "Unknown streak");
            return false;
        };

        if !increment {
            info!(id, lost = streak.current_streak, "Streak broken");
            streak.current_streak = 0;
            streak.is_active = false;
            return true;
        }

        streak.current_streak += 1;
        streak.best_streak = streak.best_streak.max(streak.current_streak);
        streak.is_active = true;
        streak.last_activity = Utc::now();

        let xp = streak.xp_per_day;
        let reason = format!("Streak: {}", streak.name);
        debug!(id, current = streak.current_streak, "Streak extended");

        if xp > 0 {
            self.award(xp, &reason);
        }
        true
    }

    // =============================
    // Challenges
    // =============================

    /// Set challenge progress, completing it once the target is reached.
    /// Completed challenges are left untouched.
    pub fn update_challenge_progress(&mut self, id: &str, progress: i64) -> bool {
        let Some(challenge) = self.stats.challenges.iter_mut().find(|c| c.id == id) else {
            debug!(id, "Unknown challenge");
            return false;
        };

        if challenge.is_completed {
            return false;
        }

        challenge.progress = clamp_progress(progress, challenge.max_progress);
        if challenge.progress >= challenge.max_progress {
            return self.complete_challenge(id);
        }
        true
    }

    /// Complete a challenge and pay out its reward, once
    pub fn complete_challenge(&mut self, id: &str) -> bool {
        let Some(challenge) = self.stats.challenges.iter_mut().find(|c| c.id == id) else {
            debug!(id, "Unknown challenge");
            return false;
        };

        if challenge.is_completed {
            return false;
        }

        challenge.is_completed = true;
        challenge.progress = challenge.max_progress;

        let reward = challenge.reward.clone();
        let title = challenge.title.clone();
        let rarity = difficulty_rarity(challenge.difficulty);
        let icon = challenge.icon.clone();

        info!(id, %title, xp = reward.xp, "Challenge completed");

        if let Some(badge_id) = reward.badge {
            if !self.stats.badges.iter().any(|b| b.id == badge_id) {
                self.stats.badges.push(Badge {
                    name: badge_name(&badge_id),
                    description: format!("Completed the {}", title),
                    id: badge_id,
                    icon,
                    earned_at: Utc::now(),
                    rarity,
                });
            }
        }

        if let Some(reward_title) = reward.title {
            if !self.stats.earned_titles.contains(&reward_title) {
                self.stats.earned_titles.push(reward_title);
            }
        }

        self.events.push(ProgressionEvent::ChallengeCompleted {
            id: id.to_string(),
            title: title.clone(),
            xp: reward.xp,
        });

        if reward.xp > 0 {
            self.award(reward.xp, &format!("Challenge: {}", title));
        }
        true
    }

    // =============================
    // Resets
    // =============================

    pub fn reset_weekly_xp(&mut self) {
        self.stats.weekly_xp = 0;
    }

    pub fn reset_monthly_xp(&mut self) {
        self.stats.monthly_xp = 0;
    }

    /// Back to the session seed
    pub fn reset(&mut self) {
        info!("Progression reset to seed");
        self.stats = seed_stats(Utc::now());
        self.events.clear();
        self.recent_awards.clear();
    }

    // =============================
    // Derived views
    // =============================

    pub fn progress_to_next_level(&self) -> f64 {
        let level = &self.stats.level;
        if level.xp_to_next == 0 {
            return 0.0;
        }
        level.current_xp as f64 / level.xp_to_next as f64 * 100.0
    }

    pub fn active_streaks(&self) -> Vec<&Streak> {
        self.stats.streaks.iter().filter(|s| s.is_active).collect()
    }

    pub fn active_challenges(&self) -> Vec<&Challenge> {
        self.stats
            .challenges
            .iter()
            .filter(|c| c.is_active && !c.is_completed)
            .collect()
    }

    /// Up to three unlocked achievements, newest first
    pub fn recent_achievements(&self) -> Vec<&Achievement> {
        let mut unlocked: Vec<&Achievement> =
            self.stats.achievements.iter().filter(|a| a.unlocked).collect();
        unlocked.sort_by(|a, b| b.unlocked_at.cmp(&a.unlocked_at));
        unlocked.truncate(RECENT_ACHIEVEMENTS);
        unlocked
    }

    /// Applied awards, oldest first
    pub fn recent_awards(&self) -> impl DoubleEndedIterator<Item = &XpAward> {
        self.recent_awards.iter()
    }

    /// Hand queued events to the caller
    pub fn drain_events(&mut self) -> Vec<ProgressionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn summary(&self) -> ProgressionSummary {
        ProgressionSummary {
            stats: self.stats.clone(),
            progress_to_next_level: self.progress_to_next_level(),
            active_streaks: self.active_streaks().into_iter().cloned().collect(),
            active_challenges: self.active_challenges().into_iter().cloned().collect(),
            recent_achievements: self.recent_achievements().into_iter().cloned().collect(),
            recent_awards: self.recent_awards().rev().cloned().collect(),
        }
    }
}

impl Default for ProgressionEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Title for a level number
pub fn level_title(level: u32) -> &'static str {
    match level {
        0..=4 => "Financial Novice",
        5..=9 => "Budget Apprentice",
        10..=14 => "Savings Specialist",
        15..=19 => "Investment Strategist",
        20..=24 => "Financial Advisor",
        25..=29 => "Wealth Builder",
        _ => "Financial Master",
    }
}

/// floor(threshold * 1.2), never below 1
fn next_threshold(threshold: u64) -> u64 {
    (threshold.saturating_mul(6) / 5).max(1)
}

fn clamp_progress(progress: i64, max_progress: u64) -> u64 {
    u64::try_from(progress).unwrap_or(0).min(max_progress)
}

fn difficulty_rarity(difficulty: Difficulty) -> Rarity {
    match difficulty {
        Difficulty::Easy => Rarity::Common,
        Difficulty::Medium => Rarity::Rare,
        Difficulty::Hard => Rarity::Epic,
    }
}

/// "weekly-saver" -> "Weekly Saver"
fn badge_name(id: &str) -> String {
    id.split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
