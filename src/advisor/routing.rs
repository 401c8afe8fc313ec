//! Keyword Router
//!
//! Maps a free-text question to one advice topic using ordered keyword
//! groups. The first group with a matching keyword wins; questions that
//! match nothing fall through to general advice.

use crate::models::AdviceCategory;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceTopic {
    EmergencyFund,
    Budgeting,
    Investing,
    Debt,
    SavingsRate,
    Goals,
    CheckIn,
    TipRequest,
}

impl AdviceTopic {
    /// Category reported to the chat transcript
    pub fn category(self) -> AdviceCategory {
        match self {
            AdviceTopic::EmergencyFund => AdviceCategory::Saving,
            AdviceTopic::Budgeting => AdviceCategory::Budgeting,
            AdviceTopic::Investing => AdviceCategory::Investing,
            AdviceTopic::Debt => AdviceCategory::Debt,
            AdviceTopic::SavingsRate => AdviceCategory::Saving,
            AdviceTopic::Goals => AdviceCategory::Saving,
            AdviceTopic::CheckIn => AdviceCategory::General,
            AdviceTopic::TipRequest => AdviceCategory::General,
        }
    }

    /// Fixed confidence of the topic's template
    pub fn confidence(self) -> f32 {
        match self {
            AdviceTopic::EmergencyFund => 0.95,
            AdviceTopic::Budgeting => 0.90,
            AdviceTopic::Investing => 0.85,
            AdviceTopic::Debt => 0.88,
            AdviceTopic::SavingsRate => 0.92,
            AdviceTopic::Goals => 0.87,
            AdviceTopic::CheckIn => 0.98,
            AdviceTopic::TipRequest => 0.92,
        }
    }
}

/// Confidence of the general fallback template
pub const GENERAL_CONFIDENCE: f32 = 0.75;

/// Routing table, in priority order
const ROUTES: &[(AdviceTopic, &[&str])] = &[
    (
        AdviceTopic::EmergencyFund,
        &["emergency fund", "emergency", "rainy day", "safety net"],
    ),
    (AdviceTopic::Budgeting, &["budget", "spending", "expense"]),
    (
        AdviceTopic::Investing,
        &["invest", "stock", "retirement", "401k", "ira", "index fund", "portfolio"],
    ),
    (
        AdviceTopic::Debt,
        &["debt", "credit card", "loan", "pay off", "mortgage"],
    ),
    (
        AdviceTopic::SavingsRate,
        &["savings rate", "save", "how much", "on track"],
    ),
    (AdviceTopic::Goals, &["goal", "vacation", "prioritize", "priority"]),
    (
        AdviceTopic::CheckIn,
        &[
            "how am i doing",
            "doing financially",
            "quick check",
            "check up",
            "check-up",
            "financial health",
            "hello",
            "hey",
            "good morning",
        ],
    ),
    (AdviceTopic::TipRequest, &["money tip", "tip"]),
];

/// Short keywords that only count as whole words ("ira" vs "aspiration",
/// "hey" vs "they")
const WHOLE_WORD_KEYWORDS: &[&str] = &["ira", "hey"];

/// Keyword groups used to label remote answers after the fact
const CATEGORY_SCAN: &[(AdviceCategory, &[&str])] = &[
    (AdviceCategory::Budgeting, &["budget", "expense", "spending"]),
    (AdviceCategory::Saving, &["save", "saving", "emergency fund"]),
    (
        AdviceCategory::Investing,
        &["invest", "stock", "retirement", "401k"],
    ),
    (AdviceCategory::Debt, &["debt", "loan", "credit card"]),
];

/// Keyword router
pub struct KeywordRouter;

impl KeywordRouter {
    /// Route a question to a topic, `None` means general advice
    pub fn route(question: &str) -> Option<AdviceTopic> {
        let lowered = question.to_lowercase();

        ROUTES
            .iter()
            .find(|(_, keywords)| matches_any(&lowered, keywords))
            .map(|(topic, _)| *topic)
    }

    /// Infer a category from generated text
    pub fn categorize_text(text: &str) -> AdviceCategory {
        let lowered = text.to_lowercase();

        CATEGORY_SCAN
            .iter()
            .find(|(_, keywords)| matches_any(&lowered, keywords))
            .map(|(category, _)| *category)
            .unwrap_or(AdviceCategory::General)
    }
}

fn matches_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| {
        if WHOLE_WORD_KEYWORDS.contains(kw) {
            contains_word(text, kw)
        } else {
            text.contains(kw)
        }
    })
}

fn contains_word(text: &str, word: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric()).any(|w| w == word)
}
