//! Financial advisor
//!
//! Answers questions about the user's finances. When a remote provider is
//! configured the advisor makes exactly one bounded call to it; any failure,
//! timeout, or missing credential falls back to the keyword-routed templates.
//! Callers always get an `AdviceResponse`.

pub mod prompt;
pub mod routing;
pub mod templates;

pub use routing::{AdviceTopic, KeywordRouter};
pub use templates::{format_money, template_advice};

use crate::config::AdvisorConfig;
use crate::error::DashboardError;
use crate::gemini::{GeminiClient, TextGenerator};
use crate::memory::{ConversationHistory, ConversationMessage};
use crate::models::{AdviceResponse, AdviceSource, FinancialSnapshot};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// Confidence reported for remote answers
const REMOTE_CONFIDENCE: f32 = 0.95;

pub struct FinancialAdvisor {
    config: RwLock<AdvisorConfig>,
    generator: RwLock<Option<Arc<dyn TextGenerator>>>,
    history: Mutex<ConversationHistory>,
}

impl FinancialAdvisor {
    /// Advisor backed by Gemini when the config carries a credential
    pub fn new(config: AdvisorConfig) -> Self {
        let generator = build_generator(&config);
        Self::from_parts(config, generator)
    }

    /// Advisor backed by an arbitrary provider
    pub fn with_generator(config: AdvisorConfig, generator: Arc<dyn TextGenerator>) -> Self {
        Self::from_parts(config, Some(generator))
    }

    fn from_parts(config: AdvisorConfig, generator: Option<Arc<dyn TextGenerator>>) -> Self {
        let history = ConversationHistory::new(config.history_exchanges);

        Self {
            config: RwLock::new(config),
            generator: RwLock::new(generator),
            history: Mutex::new(history),
        }
    }

    /// Answer a question. Never fails.
    pub async fn get_advice(&self, question: &str, snapshot: &FinancialSnapshot) -> AdviceResponse {
        let generator = self.generator.read().await.clone();

        let Some(generator) = generator else {
            debug!("No remote provider configured, answering from templates");
            return template_advice(question, snapshot);
        };

        match self.ask_remote(generator.as_ref(), question, snapshot).await {
            Ok(content) => {
                let category = KeywordRouter::categorize_text(&content);
                info!(%category, "Advice answered by remote provider");

                AdviceResponse {
                    content,
                    category,
                    confidence: REMOTE_CONFIDENCE,
                    source: AdviceSource::Remote,
                }
            }
            Err(e) => {
                warn!(error = %e, "Remote advice failed, falling back to templates");
                template_advice(question, snapshot)
            }
        }
    }

    async fn ask_remote(
        &self,
        generator: &dyn TextGenerator,
        question: &str,
        snapshot: &FinancialSnapshot,
    ) -> crate::Result<String> {
        let timeout = self.config.read().await.request_timeout;
        let system_prompt = prompt::build_system_prompt(snapshot);

        // Held until the exchange is recorded, so remote turns stay in order
        let mut history = self.history.lock().await;
        let turns: Vec<ConversationMessage> = history.messages().cloned().collect();

        let answer = tokio::time::timeout(
            timeout,
            generator.generate(&system_prompt, &turns, question),
        )
        .await
        .map_err(|_| DashboardError::Timeout(timeout))??;

        let answer = answer.trim().to_string();
        if answer.is_empty() {
            return Err(DashboardError::Llm("provider returned an empty answer".to_string()));
        }

        history.record_exchange(question, &answer);
        Ok(answer)
    }

    /// Swap in new configuration and rebuild the provider from it
    pub async fn refresh(&self, config: AdvisorConfig) {
        let generator = build_generator(&config);
        info!(connected = generator.is_some(), "Advisor configuration refreshed");

        self.history
            .lock()
            .await
            .set_max_exchanges(config.history_exchanges);
        *self.generator.write().await = generator;
        *self.config.write().await = config;
    }

    pub async fn is_connected(&self) -> bool {
        self.generator.read().await.is_some()
    }

    pub async fn clear_history(&self) {
        self.history.lock().await.clear();
    }

    pub async fn history_len(&self) -> usize {
        self.history.lock().await.message_count()
    }
}

fn build_generator(config: &AdvisorConfig) -> Option<Arc<dyn TextGenerator>> {
    match GeminiClient::from_config(config) {
        Ok(Some(client)) => Some(Arc::new(client)),
        Ok(None) => {
            info!("Gemini API key not configured, using template responses");
            None
        }
        Err(e) => {
            warn!("Failed to build Gemini client, using template responses: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AdviceCategory;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    enum Behavior {
        Answer(&'static str),
        /// Echo the question, slowly for questions starting with "A"
        Echo,
        Fail,
        Hang,
    }

    struct StubGenerator {
        behavior: Behavior,
        calls: AtomicUsize,
        max_turns_seen: AtomicUsize,
    }

    impl StubGenerator {
        fn new(behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                calls: AtomicUsize::new(0),
                max_turns_seen: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for StubGenerator {
        async fn generate(
            &self,
            system_prompt: &str,
            history: &[ConversationMessage],
            question: &str,
        ) -> crate::Result<String> {
            assert!(system_prompt.contains("Monthly Income"));
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.max_turns_seen.fetch_max(history.len(), Ordering::SeqCst);

            match self.behavior {
                Behavior::Answer(text) => Ok(text.to_string()),
                Behavior::Echo => {
                    if question.starts_with('A') {
                        tokio::time::sleep(Duration::from_millis(30)).await;
                    }
                    Ok(format!("answer to {}", question))
                }
                Behavior::Fail => Err(DashboardError::Llm("provider down".to_string())),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok("too late".to_string())
                }
            }
        }
    }

    fn config() -> AdvisorConfig {
        AdvisorConfig {
            request_timeout: Duration::from_millis(50),
            ..AdvisorConfig::offline()
        }
    }

    #[tokio::test]
    async fn test_offline_uses_templates() {
        let advisor = FinancialAdvisor::new(AdvisorConfig::offline());
        let snapshot = FinancialSnapshot::default();

        let advice = advisor.get_advice("emergency fund?", &snapshot).await;
        assert!(!advisor.is_connected().await);
        assert_eq!(advice, template_advice("emergency fund?", &snapshot));
        assert_eq!(advice.source, AdviceSource::Template);
    }

    #[tokio::test]
    async fn test_remote_answer_is_categorized_from_text() {
        let stub = StubGenerator::new(Behavior::Answer(
            "  Consider low-cost index funds and keep investing monthly.  ",
        ));
        let advisor = FinancialAdvisor::with_generator(config(), stub.clone());

        let advice = advisor
            .get_advice("what should I do?", &FinancialSnapshot::default())
            .await;

        assert_eq!(advice.source, AdviceSource::Remote);
        assert_eq!(advice.category, AdviceCategory::Investing);
        assert_eq!(advice.confidence, REMOTE_CONFIDENCE);
        assert_eq!(advice.content, "Consider low-cost index funds and keep investing monthly.");
        assert_eq!(advisor.history_len().await, 2);
    }

    #[tokio::test]
    async fn test_failure_falls_back_after_one_attempt() {
        let stub = StubGenerator::new(Behavior::Fail);
        let advisor = FinancialAdvisor::with_generator(config(), stub.clone());
        let snapshot = FinancialSnapshot::default();

        let advice = advisor.get_advice("How am I doing financially?", &snapshot).await;

        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
        assert_eq!(advice, template_advice("How am I doing financially?", &snapshot));
        assert!(advice.content.contains("51.8"));
        assert_eq!(advisor.history_len().await, 0);
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let stub = StubGenerator::new(Behavior::Hang);
        let advisor = FinancialAdvisor::with_generator(config(), stub);

        let advice = advisor
            .get_advice("budget help", &FinancialSnapshot::default())
            .await;

        assert_eq!(advice.source, AdviceSource::Template);
        assert_eq!(advice.category, AdviceCategory::Budgeting);
    }

    #[tokio::test]
    async fn test_blank_remote_answer_falls_back() {
        let stub = StubGenerator::new(Behavior::Answer("   "));
        let advisor = FinancialAdvisor::with_generator(config(), stub);

        let advice = advisor.get_advice("debt", &FinancialSnapshot::default()).await;
        assert_eq!(advice.source, AdviceSource::Template);
        assert_eq!(advice.category, AdviceCategory::Debt);
    }

    #[tokio::test]
    async fn test_history_bounded_to_ten_exchanges() {
        let stub = StubGenerator::new(Behavior::Answer("Keep saving!"));
        let advisor = FinancialAdvisor::with_generator(config(), stub.clone());
        let snapshot = FinancialSnapshot::default();

        for i in 0..13 {
            advisor.get_advice(&format!("question {}", i), &snapshot).await;
        }

        assert_eq!(advisor.history_len().await, 20);
        assert_eq!(stub.max_turns_seen.load(Ordering::SeqCst), 20);

        advisor.clear_history().await;
        assert_eq!(advisor.history_len().await, 0);
    }

    #[tokio::test]
    async fn test_refresh_without_key_disconnects() {
        let stub = StubGenerator::new(Behavior::Answer("Remote answer about saving."));
        let advisor = FinancialAdvisor::with_generator(config(), stub.clone());
        assert!(advisor.is_connected().await);

        advisor.refresh(AdvisorConfig::offline()).await;
        assert!(!advisor.is_connected().await);

        let advice = advisor.get_advice("tip please", &FinancialSnapshot::default()).await;
        assert_eq!(advice.source, AdviceSource::Template);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_refresh_with_key_connects() {
        let advisor = FinancialAdvisor::new(AdvisorConfig::offline());
        advisor
            .refresh(AdvisorConfig::offline().with_api_key("test-key"))
            .await;
        assert!(advisor.is_connected().await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_remote_calls_are_serialized() {
        let stub = StubGenerator::new(Behavior::Echo);
        let config = AdvisorConfig {
            request_timeout: Duration::from_secs(2),
            ..AdvisorConfig::offline()
        };
        let advisor = Arc::new(FinancialAdvisor::with_generator(config, stub.clone()));
        let snapshot = FinancialSnapshot::default();

        let slow = {
            let advisor = advisor.clone();
            let snapshot = snapshot.clone();
            tokio::spawn(async move { advisor.get_advice("A question", &snapshot).await })
        };
        tokio::time::sleep(Duration::from_millis(5)).await;
        let fast = advisor.get_advice("B question", &snapshot).await;

        assert_eq!(slow.await.unwrap().content, "answer to A question");
        assert_eq!(fast.content, "answer to B question");
        // the second call saw the first exchange already recorded
        assert_eq!(stub.max_turns_seen.load(Ordering::SeqCst), 2);
        assert_eq!(advisor.history_len().await, 4);
    }
}
