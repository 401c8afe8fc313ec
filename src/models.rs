//! Core data models shared by the advisor and the API layer

use serde::{Deserialize, Serialize};
use std::fmt;

//
// ================= Enums =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AdviceCategory {
    Budgeting,
    Saving,
    Investing,
    Debt,
    General,
}

/// Which path produced an advice response
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AdviceSource {
    Template,
    Remote,
}

//
// ================= Snapshot =================
//

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub title: String,
    pub current: f64,
    pub target: f64,
}

impl GoalProgress {
    pub fn new(title: impl Into<String>, current: f64, target: f64) -> Self {
        Self {
            title: title.into(),
            current,
            target,
        }
    }

    /// Completion in percent, 0 when the target is not a positive number
    pub fn percent_complete(&self) -> f64 {
        ratio(self.current, self.target) * 100.0
    }

    /// Amount still missing, never negative
    pub fn remaining(&self) -> f64 {
        finite_or_zero(self.target - self.current).max(0.0)
    }
}

/// Caller-supplied financial figures used to parameterize advice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialSnapshot {
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    pub monthly_savings: f64,
    pub total_balance: f64,
    #[serde(default)]
    pub goals: Vec<GoalProgress>,
}

impl FinancialSnapshot {
    /// Snapshot with every figure at zero and no goals
    pub fn empty() -> Self {
        Self {
            monthly_income: 0.0,
            monthly_expenses: 0.0,
            monthly_savings: 0.0,
            total_balance: 0.0,
            goals: Vec::new(),
        }
    }

    /// Monthly savings as a percentage of monthly income
    pub fn savings_rate(&self) -> f64 {
        ratio(self.monthly_savings, self.monthly_income) * 100.0
    }

    pub fn monthly_surplus(&self) -> f64 {
        finite_or_zero(self.monthly_income - self.monthly_expenses)
    }

    /// First goal whose title mentions an emergency fund
    pub fn emergency_goal(&self) -> Option<&GoalProgress> {
        self.goals
            .iter()
            .find(|g| g.title.to_lowercase().contains("emergency"))
    }

    /// Months of expenses the emergency goal currently covers
    pub fn months_of_expenses_covered(&self) -> f64 {
        self.emergency_goal()
            .map(|g| ratio(g.current, self.monthly_expenses))
            .unwrap_or(0.0)
    }

    /// Sum of what is still missing across all goals
    pub fn remaining_goal_total(&self) -> f64 {
        self.goals.iter().map(GoalProgress::remaining).sum()
    }
}

impl Default for FinancialSnapshot {
    fn default() -> Self {
        Self {
            monthly_income: 5500.0,
            monthly_expenses: 3420.0,
            monthly_savings: 2850.0,
            total_balance: 12450.0,
            goals: vec![
                GoalProgress::new("Emergency Fund", 4500.0, 6000.0),
                GoalProgress::new("Vacation to Europe", 2800.0, 5000.0),
                GoalProgress::new("Retirement Savings", 15000.0, 20000.0),
            ],
        }
    }
}

/// Division that yields 0 instead of inf/NaN
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if !denominator.is_finite() || denominator <= 0.0 {
        return 0.0;
    }
    finite_or_zero(numerator / denominator)
}

pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

//
// ================= Advice =================
//

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdviceResponse {
    pub content: String,
    pub category: AdviceCategory,
    pub confidence: f32,
    pub source: AdviceSource,
}

impl fmt::Display for AdviceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AdviceCategory::Budgeting => "budgeting",
            AdviceCategory::Saving => "saving",
            AdviceCategory::Investing => "investing",
            AdviceCategory::Debt => "debt",
            AdviceCategory::General => "general",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for AdviceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AdviceSource::Template => "Template",
            AdviceSource::Remote => "Remote",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_snapshot_figures() {
        let snapshot = FinancialSnapshot::default();
        assert_eq!(format!("{:.1}", snapshot.savings_rate()), "51.8");
        assert_eq!(snapshot.monthly_surplus(), 2080.0);
        assert_eq!(snapshot.remaining_goal_total(), 1500.0 + 2200.0 + 5000.0);
        assert_eq!(snapshot.emergency_goal().map(|g| g.current), Some(4500.0));
    }

    #[test]
    fn test_zero_snapshot_is_finite() {
        let snapshot = FinancialSnapshot {
            goals: vec![GoalProgress::new("Emergency Fund", 0.0, 0.0)],
            ..FinancialSnapshot::empty()
        };

        assert_eq!(snapshot.savings_rate(), 0.0);
        assert_eq!(snapshot.months_of_expenses_covered(), 0.0);
        assert_eq!(snapshot.goals[0].percent_complete(), 0.0);
    }

    #[test]
    fn test_category_serializes_lowercase() {
        let json = serde_json::to_string(&AdviceCategory::Investing).unwrap();
        assert_eq!(json, "\"investing\"");
    }
}
