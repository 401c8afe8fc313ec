//! Gamification data model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

//
// ================= Enums =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AchievementCategory {
    Saving,
    Budgeting,
    Investing,
    Goals,
    Streaks,
    Milestones,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

//
// ================= Level =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserLevel {
    pub level: u32,
    pub title: String,
    /// XP earned inside the current level
    pub current_xp: u64,
    /// XP needed to leave the current level
    pub xp_to_next: u64,
    pub total_xp: u64,
    pub perks: Vec<String>,
}

//
// ================= Achievements =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub category: AchievementCategory,
    pub points: u64,
    pub unlocked: bool,
    pub unlocked_at: Option<DateTime<Utc>>,
    pub progress: u64,
    pub max_progress: u64,
    pub rarity: Rarity,
}

//
// ================= Streaks =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Streak {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub current_streak: u32,
    pub best_streak: u32,
    pub last_activity: DateTime<Utc>,
    pub is_active: bool,
    pub xp_per_day: u64,
}

//
// ================= Challenges =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChallengeReward {
    pub xp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Challenge {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub reward: ChallengeReward,
    pub progress: u64,
    pub max_progress: u64,
    pub deadline: DateTime<Utc>,
    pub is_completed: bool,
    pub is_active: bool,
}

//
// ================= Badges =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Badge {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub earned_at: DateTime<Utc>,
    pub rarity: Rarity,
}

//
// ================= Aggregate =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Milestone {
    pub name: String,
    pub progress: u64,
    pub target: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GamificationStats {
    pub total_xp: u64,
    pub level: UserLevel,
    pub achievements: Vec<Achievement>,
    pub streaks: Vec<Streak>,
    pub challenges: Vec<Challenge>,
    pub badges: Vec<Badge>,
    /// Titles granted by challenge rewards
    pub earned_titles: Vec<String>,
    pub weekly_xp: u64,
    pub monthly_xp: u64,
    pub rank: String,
    pub next_milestone: Milestone,
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Rarity::Common => "Common",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
        };
        write!(f, "{}", s)
    }
}
