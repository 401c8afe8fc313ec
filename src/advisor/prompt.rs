//! System prompt composition for the remote provider

use crate::advisor::templates::format_money;
use crate::models::FinancialSnapshot;

const PERSONA: &str = r#"You are Finley, a friendly and encouraging personal financial advisor.

Guidelines:
- Be warm and celebrate progress, but stay realistic
- Give specific, actionable advice with concrete numbers when helpful
- Keep answers conversational and under 200 words
- Speak directly to the user ("you", "your")
- Focus on one of: budgeting, saving, investing, debt, or general planning"#;

/// Build the system instruction embedding the user's current figures
pub fn build_system_prompt(snapshot: &FinancialSnapshot) -> String {
    let goals = if snapshot.goals.is_empty() {
        "none yet".to_string()
    } else {
        snapshot
            .goals
            .iter()
            .map(|g| {
                format!(
                    "{}: {}/{} ({:.0}% complete)",
                    g.title,
                    format_money(g.current),
                    format_money(g.target),
                    g.percent_complete()
                )
            })
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "{}\n\nCURRENT FINANCIAL SITUATION:\n\
         - Monthly Income: {}\n\
         - Monthly Expenses: {}\n\
         - Monthly Savings: {} ({:.1}% savings rate)\n\
         - Total Balance: {}\n\
         - Goals: {}",
        PERSONA,
        format_money(snapshot.monthly_income),
        format_money(snapshot.monthly_expenses),
        format_money(snapshot.monthly_savings),
        snapshot.savings_rate(),
        format_money(snapshot.total_balance),
        goals,
    )
}
