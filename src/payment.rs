//! Payment provider integration
//!
//! Only a simulated provider exists. It validates the credential format,
//! records processed transactions in memory, and fails payments on a fixed
//! cadence so callers can exercise both outcomes deterministically.

use crate::error::DashboardError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

const KEY_PREFIX: &str = "bp_";
const MIN_KEY_LEN: usize = 32;
const API_VERSION: &str = "2.1.0";

/// Every tenth simulated payment fails by default
pub const DEFAULT_FAILURE_CADENCE: u64 = 10;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentEnvironment {
    #[default]
    Sandbox,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentConfig {
    pub api_key: String,
    pub merchant_id: String,
    #[serde(default)]
    pub environment: PaymentEnvironment,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentTransaction {
    pub id: String,
    pub amount: f64,
    pub currency: String,
    pub status: TransactionStatus,
    pub payment_method: String,
    pub timestamp: DateTime<Utc>,
    pub description: String,
    pub merchant_reference: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionHealth {
    Excellent,
    Good,
    Poor,
    Disconnected,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionStatus {
    pub is_connected: bool,
    pub last_sync: Option<DateTime<Utc>>,
    pub health: ConnectionHealth,
    pub api_version: String,
}

impl ConnectionStatus {
    fn disconnected() -> Self {
        Self {
            is_connected: false,
            last_sync: None,
            health: ConnectionHealth::Disconnected,
            api_version: "N/A".to_string(),
        }
    }
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Validate and store credentials
    async fn configure(&self, config: PaymentConfig) -> crate::Result<()>;

    async fn test_connection(&self) -> ConnectionStatus;

    async fn process_payment(
        &self,
        amount: f64,
        currency: &str,
        payment_method: &str,
    ) -> crate::Result<PaymentTransaction>;

    /// Processed transactions, newest first. Empty when unconfigured.
    async fn transaction_history(&self) -> Vec<PaymentTransaction>;

    async fn disconnect(&self);

    async fn is_configured(&self) -> bool;
}

pub struct SimulatedPaymentProvider {
    config: RwLock<Option<PaymentConfig>>,
    transactions: RwLock<Vec<PaymentTransaction>>,
    failure_cadence: u64,
    attempts: AtomicU64,
}

impl SimulatedPaymentProvider {
    pub fn new() -> Self {
        Self::with_failure_cadence(DEFAULT_FAILURE_CADENCE)
    }

    /// Every `cadence`-th payment fails; 0 means none do
    pub fn with_failure_cadence(cadence: u64) -> Self {
        Self {
            config: RwLock::new(None),
            transactions: RwLock::new(Vec::new()),
            failure_cadence: cadence,
            attempts: AtomicU64::new(0),
        }
    }
}

impl Default for SimulatedPaymentProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentProvider for SimulatedPaymentProvider {
    async fn configure(&self, config: PaymentConfig) -> crate::Result<()> {
        if !is_valid_key(&config.api_key) {
            warn!("Rejected payment configuration: invalid API key format");
            return Err(DashboardError::Payment("invalid API key format".to_string()));
        }

        info!(
            merchant_id = %config.merchant_id,
            environment = ?config.environment,
            "Payment provider configured"
        );
        *self.config.write().await = Some(config);
        Ok(())
    }

    async fn test_connection(&self) -> ConnectionStatus {
        if self.config.read().await.is_none() {
            return ConnectionStatus::disconnected();
        }

        ConnectionStatus {
            is_connected: true,
            last_sync: Some(Utc::now()),
            health: ConnectionHealth::Excellent,
            api_version: API_VERSION.to_string(),
        }
    }

    async fn process_payment(
        &self,
        amount: f64,
        currency: &str,
        payment_method: &str,
    ) -> crate::Result<PaymentTransaction> {
        if self.config.read().await.is_none() {
            return Err(DashboardError::Payment(
                "payment provider not configured".to_string(),
            ));
        }

        if !amount.is_finite() || amount <= 0.0 {
            return Err(DashboardError::InvalidInput(format!(
                "payment amount must be positive, got {}",
                amount
            )));
        }

        let currency = currency.trim().to_uppercase();
        if currency.is_empty() {
            return Err(DashboardError::InvalidInput("currency is required".to_string()));
        }

        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        let failed = self.failure_cadence > 0 && attempt % self.failure_cadence == 0;
        let status = if failed {
            TransactionStatus::Failed
        } else {
            TransactionStatus::Completed
        };

        let now = Utc::now();
        let transaction = PaymentTransaction {
            id: format!("{}{}", KEY_PREFIX, Uuid::new_v4().simple()),
            amount,
            description: format!("Payment of {:.2} {}", amount, currency),
            currency,
            status,
            payment_method: payment_method.to_string(),
            timestamp: now,
            merchant_reference: Some(format!("ref_{}", now.timestamp_millis())),
        };

        info!(
            id = %transaction.id,
            amount,
            status = ?transaction.status,
            "Payment processed"
        );

        self.transactions.write().await.push(transaction.clone());
        Ok(transaction)
    }

    async fn transaction_history(&self) -> Vec<PaymentTransaction> {
        if self.config.read().await.is_none() {
            return Vec::new();
        }
        self.transactions.read().await.iter().rev().cloned().collect()
    }

    async fn disconnect(&self) {
        info!("Payment provider disconnected");
        *self.config.write().await = None;
    }

    async fn is_configured(&self) -> bool {
        self.config.read().await.is_some()
    }
}

fn is_valid_key(key: &str) -> bool {
    key.starts_with(KEY_PREFIX) && key.len() >= MIN_KEY_LEN
}
