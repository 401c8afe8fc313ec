//! REST API server for the dashboard core
//!
//! Local bridge for the dashboard UI. One process serves one session: the
//! advisor, chat transcript, progression state, notifications, payment
//! provider and the current financial snapshot all live in `ApiState`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use uuid::Uuid;

use crate::advisor::FinancialAdvisor;
use crate::chat::ChatSession;
use crate::config::AdvisorConfig;
use crate::error::DashboardError;
use crate::models::FinancialSnapshot;
use crate::notifications::NotificationCenter;
use crate::payment::{PaymentConfig, PaymentProvider, SimulatedPaymentProvider};
use crate::progression::ProgressionEngine;

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Deserialize)]
pub struct AdviceRequest {
    pub question: String,
    /// Overrides the stored snapshot for this question only
    pub snapshot: Option<FinancialSnapshot>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct XpRequest {
    pub amount: i64,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StreakRequest {
    pub increment: bool,
}

#[derive(Debug, Deserialize)]
pub struct ProgressRequest {
    pub progress: i64,
}

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub amount: f64,
    pub currency: String,
    pub payment_method: String,
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

type ApiResult = (StatusCode, Json<ApiResponse>);

fn ok<T: Serialize>(data: T) -> ApiResult {
    (StatusCode::OK, Json(ApiResponse::success(data)))
}

fn fail(status: StatusCode, message: impl Into<String>) -> ApiResult {
    (status, Json(ApiResponse::error(message)))
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub advisor: Arc<FinancialAdvisor>,
    pub chat: Arc<ChatSession>,
    pub progression: Arc<RwLock<ProgressionEngine>>,
    pub notifications: Arc<RwLock<NotificationCenter>>,
    pub snapshot: Arc<RwLock<FinancialSnapshot>>,
    pub payments: Arc<dyn PaymentProvider>,
}

impl ApiState {
    /// Fresh session around an advisor: seeded progression and dashboard data,
    /// simulated payments
    pub fn new(advisor: Arc<FinancialAdvisor>) -> Self {
        Self {
            chat: Arc::new(ChatSession::new(advisor.clone())),
            advisor,
            progression: Arc::new(RwLock::new(ProgressionEngine::new())),
            notifications: Arc::new(RwLock::new(NotificationCenter::new())),
            snapshot: Arc::new(RwLock::new(FinancialSnapshot::default())),
            payments: Arc::new(SimulatedPaymentProvider::new()),
        }
    }
}

/// =============================
/// Health Endpoint
/// =============================

async fn health(State(state): State<ApiState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "advisor_connected": state.advisor.is_connected().await,
        "timestamp": Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Advisor Endpoints
/// =============================

async fn advice(State(state): State<ApiState>, Json(req): Json<AdviceRequest>) -> ApiResult {
    if req.question.trim().is_empty() {
        return fail(StatusCode::BAD_REQUEST, "Question must not be empty");
    }

    let snapshot = match req.snapshot {
        Some(snapshot) => snapshot,
        None => state.snapshot.read().await.clone(),
    };

    let response = state.advisor.get_advice(&req.question, &snapshot).await;
    info!(category = %response.category, source = %response.source, "Advice served");
    ok(response)
}

async fn update_snapshot(
    State(state): State<ApiState>,
    Json(snapshot): Json<FinancialSnapshot>,
) -> ApiResult {
    info!(goals = snapshot.goals.len(), "Financial snapshot updated");
    *state.snapshot.write().await = snapshot.clone();
    ok(snapshot)
}

async fn refresh_advisor(
    State(state): State<ApiState>,
    body: Option<Json<RefreshRequest>>,
) -> ApiResult {
    let req = body.map(|Json(req)| req).unwrap_or_default();

    let config = match AdvisorConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "Advisor refresh failed");
            return fail(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };
    let config = match req.api_key {
        Some(key) => config.with_api_key(key),
        None => config,
    };

    state.advisor.refresh(config).await;
    ok(serde_json::json!({ "connected": state.advisor.is_connected().await }))
}

/// =============================
/// Chat Endpoints
/// =============================

async fn send_chat(State(state): State<ApiState>, Json(req): Json<ChatRequest>) -> ApiResult {
    let snapshot = state.snapshot.read().await.clone();

    let Some(reply) = state.chat.send_message(&req.message, &snapshot).await else {
        return fail(StatusCode::BAD_REQUEST, "Message must not be empty");
    };

    ok(serde_json::json!({
        "reply": reply,
        "messages": state.chat.messages().await,
    }))
}

async fn chat_transcript(State(state): State<ApiState>) -> ApiResult {
    ok(state.chat.messages().await)
}

async fn clear_chat(State(state): State<ApiState>) -> ApiResult {
    state.chat.clear().await;
    state.advisor.clear_history().await;
    ok(state.chat.messages().await)
}

/// =============================
/// Progression Endpoints
/// =============================

/// Apply a mutation, forward its events to the notification center and
/// return the outcome together with the refreshed summary.
async fn mutate_progression<T, F>(state: &ApiState, action: F) -> serde_json::Value
where
    T: Serialize,
    F: FnOnce(&mut ProgressionEngine) -> T,
{
    let mut engine = state.progression.write().await;
    let outcome = action(&mut engine);
    let events = engine.drain_events();
    let summary = engine.summary();
    drop(engine);

    if !events.is_empty() {
        state
            .notifications
            .write()
            .await
            .push_all(events, Utc::now());
    }

    serde_json::json!({ "outcome": outcome, "summary": summary })
}

async fn progression_summary(State(state): State<ApiState>) -> ApiResult {
    ok(state.progression.read().await.summary())
}

async fn add_xp(State(state): State<ApiState>, Json(req): Json<XpRequest>) -> ApiResult {
    if req.amount <= 0 {
        return fail(StatusCode::BAD_REQUEST, "XP amount must be positive");
    }

    let reason = req.reason.unwrap_or_else(|| "Manual award".to_string());
    ok(mutate_progression(&state, |engine| engine.add_xp(req.amount, &reason)).await)
}

async fn unlock_achievement(State(state): State<ApiState>, Path(id): Path<String>) -> ApiResult {
    ok(mutate_progression(&state, |engine| engine.unlock_achievement(&id)).await)
}

async fn update_streak(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(req): Json<StreakRequest>,
) -> ApiResult {
    ok(mutate_progression(&state, |engine| engine.update_streak(&id, req.increment)).await)
}

async fn update_challenge_progress(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(req): Json<ProgressRequest>,
) -> ApiResult {
    ok(mutate_progression(&state, |engine| {
        engine.update_challenge_progress(&id, req.progress)
    })
    .await)
}

async fn complete_challenge(State(state): State<ApiState>, Path(id): Path<String>) -> ApiResult {
    ok(mutate_progression(&state, |engine| engine.complete_challenge(&id)).await)
}

/// =============================
/// Notification Endpoints
/// =============================

async fn list_notifications(State(state): State<ApiState>) -> ApiResult {
    let now = Utc::now();
    let mut center = state.notifications.write().await;
    center.prune(now);
    ok(center.visible(now))
}

async fn dismiss_notification(State(state): State<ApiState>, Path(id): Path<Uuid>) -> ApiResult {
    if state.notifications.write().await.dismiss(id) {
        ok(serde_json::json!({ "dismissed": id }))
    } else {
        fail(StatusCode::NOT_FOUND, format!("Notification {} not found", id))
    }
}

/// =============================
/// Payment Endpoints
/// =============================

fn payment_failure(e: DashboardError) -> ApiResult {
    let status = match e {
        DashboardError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        DashboardError::Payment(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    fail(status, e.to_string())
}

async fn configure_payments(
    State(state): State<ApiState>,
    Json(config): Json<PaymentConfig>,
) -> ApiResult {
    match state.payments.configure(config).await {
        Ok(()) => ok(state.payments.test_connection().await),
        Err(e) => payment_failure(e),
    }
}

async fn payment_status(State(state): State<ApiState>) -> ApiResult {
    ok(state.payments.test_connection().await)
}

async fn process_payment(
    State(state): State<ApiState>,
    Json(req): Json<PaymentRequest>,
) -> ApiResult {
    match state
        .payments
        .process_payment(req.amount, &req.currency, &req.payment_method)
        .await
    {
        Ok(transaction) => ok(transaction),
        Err(e) => payment_failure(e),
    }
}

async fn payment_history(State(state): State<ApiState>) -> ApiResult {
    ok(state.payments.transaction_history().await)
}

async fn disconnect_payments(State(state): State<ApiState>) -> ApiResult {
    state.payments.disconnect().await;
    ok(state.payments.test_connection().await)
}

/// =============================
/// Router
/// =============================

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/advice", post(advice))
        .route("/api/snapshot", put(update_snapshot))
        .route(
            "/api/chat",
            post(send_chat).get(chat_transcript).delete(clear_chat),
        )
        .route("/api/advisor/refresh", post(refresh_advisor))
        .route("/api/progression", get(progression_summary))
        .route("/api/progression/xp", post(add_xp))
        .route(
            "/api/progression/achievements/:id/unlock",
            post(unlock_achievement),
        )
        .route("/api/progression/streaks/:id", post(update_streak))
        .route(
            "/api/progression/challenges/:id/progress",
            post(update_challenge_progress),
        )
        .route(
            "/api/progression/challenges/:id/complete",
            post(complete_challenge),
        )
        .route("/api/notifications", get(list_notifications))
        .route(
            "/api/notifications/:id",
            axum::routing::delete(dismiss_notification),
        )
        .route(
            "/api/payments",
            post(process_payment).delete(disconnect_payments),
        )
        .route("/api/payments/configure", post(configure_payments))
        .route("/api/payments/status", get(payment_status))
        .route("/api/payments/history", get(payment_history))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(state: ApiState, port: u16) -> crate::Result<()> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn state() -> ApiState {
        ApiState::new(Arc::new(FinancialAdvisor::new(AdvisorConfig::offline())))
    }

    async fn call(
        state: &ApiState,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = create_router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = call(&state(), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["advisor_connected"], false);
    }

    #[tokio::test]
    async fn test_advice_uses_stored_snapshot() {
        let (status, body) = call(
            &state(),
            "POST",
            "/api/advice",
            Some(json!({ "question": "How am I doing financially?" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["category"], "general");
        assert!(body["data"]["content"].as_str().unwrap().contains("51.8"));
    }

    #[tokio::test]
    async fn test_blank_question_rejected() {
        let (status, body) =
            call(&state(), "POST", "/api/advice", Some(json!({ "question": "  " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_snapshot_update_changes_advice() {
        let state = state();
        let snapshot = json!({
            "monthly_income": 0.0,
            "monthly_expenses": 0.0,
            "monthly_savings": 0.0,
            "total_balance": 0.0,
            "goals": []
        });

        let (status, _) = call(&state, "PUT", "/api/snapshot", Some(snapshot)).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = call(
            &state,
            "POST",
            "/api/advice",
            Some(json!({ "question": "How am I doing financially?" })),
        )
        .await;
        let content = body["data"]["content"].as_str().unwrap();
        assert!(!content.contains("NaN"));
        assert!(!content.contains("51.8"));
    }

    #[tokio::test]
    async fn test_chat_round_trip() {
        let state = state();

        let (status, body) =
            call(&state, "POST", "/api/chat", Some(json!({ "message": "debt help" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["reply"]["category"], "debt");
        assert_eq!(body["data"]["messages"].as_array().unwrap().len(), 3);

        let (status, _) =
            call(&state, "POST", "/api/chat", Some(json!({ "message": "" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = call(&state, "DELETE", "/api/chat", None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let (_, body) = call(&state, "GET", "/api/chat", None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_with_key_connects() {
        let state = state();
        let (status, body) = call(
            &state,
            "POST",
            "/api/advisor/refresh",
            Some(json!({ "api_key": "test-key" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["connected"], true);

        let (_, body) = call(
            &state,
            "POST",
            "/api/advisor/refresh",
            Some(json!({ "api_key": "" })),
        )
        .await;
        assert_eq!(body["data"]["connected"], false);
    }

    #[tokio::test]
    async fn test_xp_award_and_level_up_notification() {
        let state = state();

        let (status, _) =
            call(&state, "POST", "/api/progression/xp", Some(json!({ "amount": -5 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = call(
            &state,
            "POST",
            "/api/progression/xp",
            Some(json!({ "amount": 400, "reason": "Monthly budget kept" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["outcome"]["leveled_up"], true);
        assert_eq!(body["data"]["summary"]["stats"]["level"]["level"], 9);

        let (_, body) = call(&state, "GET", "/api/notifications", None).await;
        let notifications = body["data"].as_array().unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0]["title"], "Level Up!");

        let id = notifications[0]["id"].as_str().unwrap().to_string();
        let uri = format!("/api/notifications/{}", id);
        let (status, _) = call(&state, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = call(&state, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_challenge_and_achievement_routes() {
        let state = state();

        let (_, body) = call(
            &state,
            "POST",
            "/api/progression/challenges/weekly-savings/progress",
            Some(json!({ "progress": 100 })),
        )
        .await;
        assert_eq!(body["data"]["outcome"], true);

        let (_, body) = call(
            &state,
            "POST",
            "/api/progression/challenges/weekly-savings/complete",
            None,
        )
        .await;
        assert_eq!(body["data"]["outcome"], false);

        let (_, body) = call(
            &state,
            "POST",
            "/api/progression/achievements/budget-master/unlock",
            None,
        )
        .await;
        assert_eq!(body["data"]["outcome"], true);

        let (_, body) = call(
            &state,
            "POST",
            "/api/progression/streaks/no-impulse-buy",
            Some(json!({ "increment": false })),
        )
        .await;
        assert_eq!(body["data"]["outcome"], true);

        let (_, body) = call(&state, "GET", "/api/progression", None).await;
        let stats = &body["data"]["stats"];
        assert_eq!(stats["streaks"][2]["best_streak"], 18);
        assert_eq!(stats["total_xp"], 2350 + 100 + 200);

        // challenge, achievement, and the level-up the achievement points caused
        let (_, body) = call(&state, "GET", "/api/notifications", None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_payment_routes() {
        let state = state();

        let (status, body) = call(
            &state,
            "POST",
            "/api/payments",
            Some(json!({ "amount": 10.0, "currency": "USD", "payment_method": "card" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["success"], false);

        let (status, _) = call(
            &state,
            "POST",
            "/api/payments/configure",
            Some(json!({ "api_key": "bp_short", "merchant_id": "m-1" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, body) = call(
            &state,
            "POST",
            "/api/payments/configure",
            Some(json!({ "api_key": format!("bp_{}", "k".repeat(29)), "merchant_id": "m-1" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["is_connected"], true);

        let (status, body) = call(
            &state,
            "POST",
            "/api/payments",
            Some(json!({ "amount": 42.5, "currency": "usd", "payment_method": "card" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "completed");
        assert_eq!(body["data"]["currency"], "USD");

        let (status, _) = call(
            &state,
            "POST",
            "/api/payments",
            Some(json!({ "amount": -1.0, "currency": "usd", "payment_method": "card" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = call(&state, "GET", "/api/payments/history", None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let (_, body) = call(&state, "DELETE", "/api/payments", None).await;
        assert_eq!(body["data"]["is_connected"], false);
        let (_, body) = call(&state, "GET", "/api/payments/status", None).await;
        assert_eq!(body["data"]["health"], "disconnected");
    }
}
