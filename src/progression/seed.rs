//! Session seed
//!
//! Every session starts from this fixed state. Relative dates (deadlines,
//! last activity) are computed from the moment the seed is built.

use crate::progression::engine::level_title;
use crate::progression::model::{
    Achievement, AchievementCategory, Badge, Challenge, ChallengeReward, Difficulty,
    GamificationStats, Milestone, Rarity, Streak, UserLevel,
};
use chrono::{DateTime, Duration, TimeZone, Utc};

fn date(year: i32, month: u32, day: u32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).single()
}

fn achievement(
    id: &str,
    title: &str,
    description: &str,
    icon: &str,
    category: AchievementCategory,
    points: u64,
    (progress, max_progress): (u64, u64),
    rarity: Rarity,
    unlocked_at: Option<DateTime<Utc>>,
) -> Achievement {
    Achievement {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        icon: icon.to_string(),
        category,
        points,
        unlocked: unlocked_at.is_some(),
        unlocked_at,
        progress,
        max_progress,
        rarity,
    }
}

pub fn seed_achievements() -> Vec<Achievement> {
    use AchievementCategory::*;

    vec![
        achievement("first-save", "First Steps", "Made your first savings transaction", "🎯", Saving, 50, (1, 1), Rarity::Common, date(2024, 1, 1)),
        achievement("emergency-fund-25", "Safety Net Builder", "Built 25% of your emergency fund", "🛡️", Saving, 100, (1, 1), Rarity::Common, date(2024, 1, 10)),
        achievement("budget-master", "Budget Master", "Stay under budget for 3 consecutive months", "📊", Budgeting, 200, (2, 3), Rarity::Rare, None),
        achievement("investment-starter", "Investment Pioneer", "Make your first investment", "📈", Investing, 150, (1, 1), Rarity::Common, date(2024, 1, 15)),
        achievement("goal-crusher", "Goal Crusher", "Complete 5 financial goals", "🏆", Goals, 300, (1, 5), Rarity::Epic, None),
        achievement("streak-legend", "Consistency Legend", "Maintain a 30-day saving streak", "🔥", Streaks, 500, (15, 30), Rarity::Legendary, None),
        achievement("millionaire-mindset", "Millionaire Mindset", "Reach $100,000 in total assets", "💎", Milestones, 1000, (29_750, 100_000), Rarity::Legendary, None),
    ]
}

pub fn seed_streaks(now: DateTime<Utc>) -> Vec<Streak> {
    let streak = |id: &str, name: &str, description: &str, icon: &str, current: u32, best: u32, last: DateTime<Utc>, active: bool, xp: u64| Streak {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        icon: icon.to_string(),
        current_streak: current,
        best_streak: best,
        last_activity: last,
        is_active: active,
        xp_per_day: xp,
    };

    vec![
        streak("daily-budget-check", "Budget Tracker", "Check your budget daily", "📱", 15, 23, now, true, 10),
        streak("savings-streak", "Savings Warrior", "Save money every day", "💰", 8, 12, now, true, 25),
        streak("no-impulse-buy", "Impulse Control", "Avoid impulse purchases", "🛡️", 5, 18, now - Duration::days(1), false, 15),
    ]
}

pub fn seed_challenges(now: DateTime<Utc>) -> Vec<Challenge> {
    vec![
        Challenge {
            id: "weekly-savings".to_string(),
            title: "Weekly Savings Challenge".to_string(),
            description: "Save $100 this week".to_string(),
            icon: "💪".to_string(),
            category: "saving".to_string(),
            difficulty: Difficulty::Easy,
            reward: ChallengeReward {
                xp: 100,
                badge: Some("weekly-saver".to_string()),
                title: None,
            },
            progress: 65,
            max_progress: 100,
            deadline: now + Duration::days(3),
            is_completed: false,
            is_active: true,
        },
        Challenge {
            id: "expense-tracking".to_string(),
            title: "Expense Detective".to_string(),
            description: "Track all expenses for 7 days".to_string(),
            icon: "🔍".to_string(),
            category: "budgeting".to_string(),
            difficulty: Difficulty::Medium,
            reward: ChallengeReward {
                xp: 150,
                badge: None,
                title: Some("Budget Detective".to_string()),
            },
            progress: 4,
            max_progress: 7,
            deadline: now + Duration::days(5),
            is_completed: false,
            is_active: true,
        },
        Challenge {
            id: "investment-research".to_string(),
            title: "Market Scholar".to_string(),
            description: "Research 3 investment options".to_string(),
            icon: "📚".to_string(),
            category: "investing".to_string(),
            difficulty: Difficulty::Hard,
            reward: ChallengeReward {
                xp: 250,
                badge: Some("market-scholar".to_string()),
                title: Some("Investment Researcher".to_string()),
            },
            progress: 1,
            max_progress: 3,
            deadline: now + Duration::days(14),
            is_completed: false,
            is_active: true,
        },
    ]
}

pub fn seed_badges() -> Vec<Badge> {
    let badge = |id: &str, name: &str, description: &str, icon: &str, earned: Option<DateTime<Utc>>, rarity: Rarity| {
        earned.map(|earned_at| Badge {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            icon: icon.to_string(),
            earned_at,
            rarity,
        })
    };

    [
        badge("early-bird", "Early Bird", "Started your financial journey", "🐦", date(2024, 1, 1), Rarity::Common),
        badge("goal-setter", "Goal Setter", "Created your first financial goal", "🎯", date(2024, 1, 2), Rarity::Common),
        badge("streak-master", "Streak Master", "Maintained a 7-day streak", "🔥", date(2024, 1, 8), Rarity::Rare),
        badge("investment-guru", "Investment Guru", "Made 10 successful investments", "📈", date(2024, 1, 20), Rarity::Epic),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Stats every session starts from
pub fn seed_stats(now: DateTime<Utc>) -> GamificationStats {
    let level = 8;

    GamificationStats {
        total_xp: 2350,
        level: UserLevel {
            level,
            title: level_title(level).to_string(),
            current_xp: 350,
            xp_to_next: 650,
            total_xp: 2350,
            perks: vec![
                "Advanced analytics unlocked".to_string(),
                "Priority AI advisor responses".to_string(),
                "Custom goal categories".to_string(),
                "Investment insights".to_string(),
            ],
        },
        achievements: seed_achievements(),
        streaks: seed_streaks(now),
        challenges: seed_challenges(now),
        badges: seed_badges(),
        earned_titles: Vec::new(),
        weekly_xp: 180,
        monthly_xp: 750,
        rank: "Top 15%".to_string(),
        next_milestone: Milestone {
            name: "Financial Expert".to_string(),
            progress: 2350,
            target: 3000,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seed_respects_invariants() {
        let stats = seed_stats(Utc::now());

        assert!(stats.level.current_xp < stats.level.xp_to_next);

        for a in &stats.achievements {
            assert_eq!(a.unlocked, a.unlocked_at.is_some(), "{}", a.id);
            if a.unlocked {
                assert!(a.progress >= a.max_progress, "{}", a.id);
            }
        }
        for s in &stats.streaks {
            assert!(s.best_streak >= s.current_streak, "{}", s.id);
        }

        let ids: HashSet<_> = stats.achievements.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids.len(), stats.achievements.len());
        assert_eq!(stats.badges.len(), 4);
    }
}
