//! Template responses
//!
//! Each routed topic has a fixed prose skeleton filled with figures from
//! the snapshot. Rendering is a pure function of its inputs.

use crate::advisor::routing::{AdviceTopic, KeywordRouter, GENERAL_CONFIDENCE};
use crate::models::{
    finite_or_zero, AdviceCategory, AdviceResponse, AdviceSource, FinancialSnapshot, GoalProgress,
};
use sha2::{Digest, Sha256};
use tracing::debug;

const MONEY_TIPS: &[&str] = &[
    "Wait 24 hours before any non-essential purchase over $50. Most of the urge is gone by tomorrow.",
    "Pay yourself first: schedule the transfer to savings for payday and spend what's left.",
    "Give every goal its own savings account so each balance has a single job.",
    "Brew coffee at home four days out of five. $20 a week is $1,040 a year.",
    "Shop with a list and stick to it. Stores are laid out to make you wander.",
    "Put recurring bills on a rewards card and clear the balance in full every month.",
    "Review your subscriptions every quarter and cancel anything you haven't opened in a month.",
];

/// Answer a question from templates only
pub fn template_advice(question: &str, snapshot: &FinancialSnapshot) -> AdviceResponse {
    let topic = KeywordRouter::route(question);
    debug!(?topic, "Routed advice question");

    match topic {
        Some(topic) => AdviceResponse {
            content: render_topic(topic, question, snapshot),
            category: topic.category(),
            confidence: topic.confidence(),
            source: AdviceSource::Template,
        },
        None => AdviceResponse {
            content: general_advice(snapshot),
            category: AdviceCategory::General,
            confidence: GENERAL_CONFIDENCE,
            source: AdviceSource::Template,
        },
    }
}

fn render_topic(topic: AdviceTopic, question: &str, snapshot: &FinancialSnapshot) -> String {
    match topic {
        AdviceTopic::EmergencyFund => emergency_fund_advice(snapshot),
        AdviceTopic::Budgeting => budgeting_advice(snapshot),
        AdviceTopic::Investing => investing_advice(snapshot),
        AdviceTopic::Debt => debt_advice(snapshot),
        AdviceTopic::SavingsRate => savings_rate_advice(snapshot),
        AdviceTopic::Goals => goals_advice(snapshot),
        AdviceTopic::CheckIn => check_in(snapshot),
        AdviceTopic::TipRequest => money_tip(question),
    }
}

fn emergency_fund_advice(snapshot: &FinancialSnapshot) -> String {
    let expenses = finite_or_zero(snapshot.monthly_expenses);
    let (saved, percent) = snapshot
        .emergency_goal()
        .map(|g| (finite_or_zero(g.current), g.percent_complete()))
        .unwrap_or((0.0, 0.0));

    let low = expenses * 3.0;
    let high = expenses * 6.0;
    let top_up = ((low - saved).max(0.0) / 6.0).ceil();

    format!(
        "Based on your monthly expenses of {}, your emergency fund of {} covers {:.1} months. \
         The usual target is 3-6 months of expenses ({}-{}), and you're {}% of the way to your goal. \
         Setting aside {} a month would reach the 3-month mark within 6 months.",
        format_money(expenses),
        format_money(saved),
        snapshot.months_of_expenses_covered(),
        format_money(low),
        format_money(high),
        whole_percent(percent),
        format_money(top_up),
    )
}

fn budgeting_advice(snapshot: &FinancialSnapshot) -> String {
    let rate = snapshot.savings_rate();
    let income = finite_or_zero(snapshot.monthly_income);

    format!(
        "Your current savings rate is {:.1}%, which is {}. The 50/30/20 rule suggests {} for needs, \
         {} for wants and {} for savings each month. Your expenses are {}, which leaves room for {}.",
        rate,
        rate_verdict(rate),
        format_money(income * 0.5),
        format_money(income * 0.3),
        format_money(income * 0.2),
        format_money(snapshot.monthly_expenses),
        if rate < 20.0 { "improvement" } else { "optimization" },
    )
}

fn investing_advice(snapshot: &FinancialSnapshot) -> String {
    let income = finite_or_zero(snapshot.monthly_income);

    format!(
        "With {} going into savings every month, you're in a position to invest. \
         1) Capture any employer 401(k) match first. 2) Keep the emergency fund topped up. \
         3) Favor low-cost index funds for long-term growth. Investing 10-15% of your {} monthly \
         income ({}-{}) keeps retirement on track.",
        format_money(snapshot.monthly_savings),
        format_money(income),
        format_money(income * 0.10),
        format_money(income * 0.15),
    )
}

fn debt_advice(snapshot: &FinancialSnapshot) -> String {
    format!(
        "Pay the minimum on every debt, then send each extra dollar to the highest-interest balance \
         first (the avalanche method). Credit card debt at 18-25% APR should come before investing, \
         while lower-rate debt like a 3-7% mortgage can be paid on schedule as you invest. \
         Your monthly surplus of {} gives you room to move faster.",
        format_money(snapshot.monthly_surplus()),
    )
}

fn savings_rate_advice(snapshot: &FinancialSnapshot) -> String {
    let rate = snapshot.savings_rate();

    format!(
        "Your savings rate of {:.1}% is {}. A common guideline is 20% at minimum and 30% or more \
         for early retirement. At {} a month in income, even a small increase compounds \
         significantly over time.",
        rate,
        rate_verdict(rate),
        format_money(snapshot.monthly_income),
    )
}

fn goals_advice(snapshot: &FinancialSnapshot) -> String {
    let Some(focus) = focus_goal(&snapshot.goals) else {
        return format!(
            "You don't have any goals set up yet. A good first one is an emergency fund of 3 months \
             of expenses ({}); add the things you care about after that.",
            format_money(snapshot.monthly_expenses * 3.0),
        );
    };

    format!(
        "You have {} active goal{} with {} left to save. {} is {}% complete. \
         Keep each goal in its own savings account and automate the transfers so progress \
         happens on its own. Order of priority: emergency fund, high-interest debt, retirement, \
         then lifestyle goals.",
        snapshot.goals.len(),
        if snapshot.goals.len() == 1 { "" } else { "s" },
        format_money(snapshot.remaining_goal_total()),
        focus.title,
        whole_percent(focus.percent_complete()),
    )
}

fn check_in(snapshot: &FinancialSnapshot) -> String {
    let rate = snapshot.savings_rate();

    format!(
        "Here's your quick check-in: your net balance is {} and your savings rate is {:.1}%, \
         which is {}. You keep {} a month after expenses. Keep it up!",
        format_money(snapshot.total_balance),
        rate,
        rate_verdict(rate),
        format_money(snapshot.monthly_surplus()),
    )
}

fn money_tip(question: &str) -> String {
    format!(
        "Here's a money tip: {} Small changes add up to big results over time.",
        pick_tip(question)
    )
}

fn general_advice(snapshot: &FinancialSnapshot) -> String {
    format!(
        "Based on your financial profile, your monthly surplus of {} shows good discipline. \
         Next steps: 1) finish the emergency fund, 2) maximize retirement contributions, \
         3) use tax-advantaged accounts, 4) review and rebalance investments once a year. \
         Ask me about budgeting, investing or goal planning any time.",
        format_money(snapshot.monthly_surplus()),
    )
}

/// Incomplete goal closest to done, or the first goal when all are done
fn focus_goal(goals: &[GoalProgress]) -> Option<&GoalProgress> {
    goals
        .iter()
        .filter(|g| g.percent_complete() < 100.0)
        .max_by(|a, b| a.percent_complete().total_cmp(&b.percent_complete()))
        .or_else(|| goals.first())
}

/// Same question, same tip
fn pick_tip(question: &str) -> &'static str {
    let digest = Sha256::digest(question.trim().to_lowercase().as_bytes());
    MONEY_TIPS[digest[0] as usize % MONEY_TIPS.len()]
}

fn rate_verdict(rate: f64) -> &'static str {
    if rate > 20.0 {
        "excellent"
    } else if rate > 15.0 {
        "good"
    } else {
        "a solid start with room to grow"
    }
}

fn whole_percent(percent: f64) -> i64 {
    finite_or_zero(percent).round() as i64
}

/// Dollar amount with thousands separators; cents only when non-zero
pub fn format_money(amount: f64) -> String {
    let amount = finite_or_zero(amount);
    let cents = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };

    let whole = group_thousands(cents / 100);
    match cents % 100 {
        0 => format!("{}${}", sign, whole),
        fraction => format!("{}${}.{:02}", sign, whole, fraction),
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_no_nan(text: &str) {
        assert!(!text.contains("NaN"), "{}", text);
        assert!(!text.contains("inf"), "{}", text);
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(0.0), "$0");
        assert_eq!(format_money(950.0), "$950");
        assert_eq!(format_money(3420.0), "$3,420");
        assert_eq!(format_money(1650.5), "$1,650.50");
        assert_eq!(format_money(1234567.891), "$1,234,567.89");
        assert_eq!(format_money(-2080.0), "-$2,080");
        assert_eq!(format_money(f64::NAN), "$0");
        assert_eq!(format_money(f64::INFINITY), "$0");
    }

    #[test]
    fn test_emergency_fund_reports_months_covered() {
        let snapshot = FinancialSnapshot::default();
        let advice = template_advice("Tell me about my emergency fund", &snapshot);

        let expected = format!("{:.1}", 4500.0 / 3420.0);
        assert_eq!(advice.category, AdviceCategory::Saving);
        assert_eq!(advice.confidence, 0.95);
        assert!(advice.content.contains(&format!("covers {} months", expected)));
        assert!(advice.content.contains("$10,260-$20,520"));
        assert!(advice.content.contains("75%"));
        // (10260 - 4500) / 6
        assert!(advice.content.contains("$960 a month"));
    }

    #[test]
    fn test_emergency_fund_months_for_other_snapshots() {
        let snapshots = vec![
            FinancialSnapshot {
                monthly_expenses: 2000.0,
                goals: vec![GoalProgress::new("Emergency savings", 7000.0, 12000.0)],
                ..FinancialSnapshot::default()
            },
            FinancialSnapshot {
                monthly_expenses: 4100.0,
                goals: vec![GoalProgress::new("emergency fund", 1230.0, 24600.0)],
                ..FinancialSnapshot::default()
            },
        ];

        for snapshot in snapshots {
            let advice = template_advice("emergency", &snapshot);
            let months = snapshot.goals[0].current / snapshot.monthly_expenses;
            assert_eq!(advice.category, AdviceCategory::Saving);
            assert!(advice.content.contains(&format!("{:.1} months", months)));
        }
    }

    #[test]
    fn test_check_in_reports_savings_rate() {
        let snapshot = FinancialSnapshot {
            monthly_income: 5500.0,
            monthly_expenses: 3420.0,
            monthly_savings: 2850.0,
            ..FinancialSnapshot::default()
        };

        let advice = template_advice("How am I doing financially?", &snapshot);
        assert_eq!(advice.category, AdviceCategory::General);
        assert_eq!(advice.confidence, 0.98);
        assert!(advice.content.contains("51.8"));
        assert!(advice.content.contains("$12,450"));
    }

    #[test]
    fn test_budgeting_split() {
        let advice = template_advice("help with my budget", &FinancialSnapshot::default());
        assert_eq!(advice.category, AdviceCategory::Budgeting);
        assert!(advice.content.contains("$2,750 for needs"));
        assert!(advice.content.contains("$1,650 for wants"));
        assert!(advice.content.contains("$1,100 for savings"));
        assert!(advice.content.contains("excellent"));
    }

    #[test]
    fn test_goals_focus_on_closest_incomplete_goal() {
        let advice = template_advice("which goal first?", &FinancialSnapshot::default());
        assert_eq!(advice.category, AdviceCategory::Saving);
        assert!(advice.content.contains("3 active goals"));
        assert!(advice.content.contains("$8,700 left"));
        assert!(advice.content.contains("Retirement Savings is 75% complete"));
    }

    #[test]
    fn test_general_fallback() {
        let advice = template_advice("What's the weather like?", &FinancialSnapshot::default());
        assert_eq!(advice.category, AdviceCategory::General);
        assert_eq!(advice.confidence, GENERAL_CONFIDENCE);
        assert!(advice.content.contains("$2,080"));
    }

    #[test]
    fn test_tip_is_deterministic() {
        let snapshot = FinancialSnapshot::default();
        let first = template_advice("give me a money tip", &snapshot);
        let second = template_advice("give me a money tip", &snapshot);
        assert_eq!(first, second);
        assert!(MONEY_TIPS.iter().any(|tip| first.content.contains(tip)));
    }

    #[test]
    fn test_zero_snapshot_never_produces_nan() {
        let zero = FinancialSnapshot {
            goals: vec![GoalProgress::new("Emergency Fund", 0.0, 0.0)],
            ..FinancialSnapshot::empty()
        };
        let questions = [
            "emergency fund",
            "budget",
            "invest",
            "debt",
            "savings rate",
            "goal",
            "how am i doing",
            "tip",
            "anything else",
        ];

        for question in questions {
            let advice = template_advice(question, &zero);
            assert_no_nan(&advice.content);
        }

        let no_goals = template_advice("goal", &FinancialSnapshot::empty());
        assert!(no_goals.content.contains("don't have any goals"));
    }

    #[test]
    fn test_template_does_not_mutate_snapshot() {
        let snapshot = FinancialSnapshot::default();
        let before = snapshot.clone();
        let _ = template_advice("emergency fund", &snapshot);
        assert_eq!(snapshot, before);
    }
}
