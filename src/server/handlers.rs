// HTTP request handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;

use super::SolaceServer;
use crate::conversation::Message;
use crate::crisis::{resources, RiskAssessment, RiskLevel};
use crate::errors::ValidationError;
use crate::metrics::METRICS;
use crate::sentiment::{emotion_insights, SentimentLabel};

const SENTIMENT_MODEL_NAME: &str = "distilbert-base-uncased-finetuned-sst-2-english";
const MAX_CONVERSATION_HISTORY: usize = 20;
const DISCLAIMER: &str = "This chatbot provides non-clinical mental wellness support. \
It is not a substitute for professional medical advice.";

/// Create the main application router
pub fn create_router(server: Arc<SolaceServer>) -> Router {
    Router::new()
        .route("/chat", post(handle_chat))
        .route("/analyze-sentiment", post(analyze_sentiment))
        .route("/assess-risk", post(assess_risk))
        .route("/resources/:level", get(get_resources))
        .route("/config", get(get_config))
        // Health and metrics
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_endpoint))
        .with_state(server)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(CorsLayer::permissive())
}

/// Turn a handler panic into the generic 500 body
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    AppError::Internal(anyhow::anyhow!("Handler panicked: {}", detail)).into_response()
}

/// Request body for /chat, /analyze-sentiment and /assess-risk
#[derive(Debug, Deserialize, Serialize)]
pub struct ChatRequest {
    pub message: String,
    /// Prior turns, oldest first
    #[serde(default)]
    pub conversation_history: Vec<Message>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SentimentAnalysis {
    pub label: SentimentLabel,
    pub score: f32,
}

/// Response body for /chat
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub user_message: String,
    pub sentiment: SentimentAnalysis,
    pub is_high_risk: bool,
    pub risk_level: RiskLevel,
    pub bot_response: String,
    pub conversation_summary: String,
}

/// Handle POST /chat - Main chat endpoint
async fn handle_chat(
    State(server): State<Arc<SolaceServer>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(request) = payload.map_err(|rejection| {
        METRICS.validation_rejections.inc();
        AppError::from(rejection)
    })?;
    let max_chars = server.config().limits.max_message_chars;
    let message = Message::user_with_limit(&request.message, max_chars).map_err(|e| {
        METRICS.validation_rejections.inc();
        AppError::from(e)
    })?;

    let result = server
        .pipeline()
        .process(&message, &request.conversation_history)
        .await;

    Ok(Json(ChatResponse {
        user_message: result.original_message,
        sentiment: SentimentAnalysis {
            label: result.sentiment.label,
            score: result.sentiment.score,
        },
        is_high_risk: result.risk.is_high_risk,
        risk_level: result.risk.risk_level,
        bot_response: result.reply,
        conversation_summary: result.summary,
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SentimentResponse {
    pub label: SentimentLabel,
    pub score: f32,
    pub emotion_insight: String,
}

/// Handle POST /analyze-sentiment
async fn analyze_sentiment(
    State(server): State<Arc<SolaceServer>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<SentimentResponse>, AppError> {
    let Json(request) = payload?;
    let result = server.pipeline().classifier().classify(&request.message).await;

    Ok(Json(SentimentResponse {
        label: result.label,
        score: result.score,
        emotion_insight: emotion_insights(&result).to_string(),
    }))
}

/// Response body for /assess-risk
#[derive(Debug, Serialize, Deserialize)]
pub struct RiskResponse {
    pub is_high_risk: bool,
    pub risk_level: RiskLevel,
    pub risk_indicators: Vec<String>,
}

impl From<RiskAssessment> for RiskResponse {
    fn from(assessment: RiskAssessment) -> Self {
        Self {
            is_high_risk: assessment.is_high_risk,
            risk_level: assessment.risk_level,
            risk_indicators: assessment
                .indicators
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Handle POST /assess-risk
async fn assess_risk(
    State(server): State<Arc<SolaceServer>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<RiskResponse>, AppError> {
    let Json(request) = payload?;
    Ok(Json(server.pipeline().assessor().assess(&request.message).into()))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResourcesResponse {
    pub risk_level: RiskLevel,
    pub resources: Vec<String>,
}

/// Handle GET /resources/:level - unknown levels get the low-risk list
async fn get_resources(Path(level): Path<String>) -> Json<ResourcesResponse> {
    let risk_level = level.parse().unwrap_or(RiskLevel::Low);

    Json(ResourcesResponse {
        risk_level,
        resources: resources(risk_level).iter().map(|r| r.to_string()).collect(),
    })
}

/// Non-sensitive configuration for clients
#[derive(Debug, Serialize, Deserialize)]
pub struct ClientConfig {
    pub max_conversation_history: usize,
    pub sentiment_model: String,
    pub emotion_labels: Vec<SentimentLabel>,
    pub risk_detection_enabled: bool,
    pub disclaimer: String,
}

/// Handle GET /config
async fn get_config() -> Json<ClientConfig> {
    Json(ClientConfig {
        max_conversation_history: MAX_CONVERSATION_HISTORY,
        sentiment_model: SENTIMENT_MODEL_NAME.to_string(),
        emotion_labels: vec![SentimentLabel::Negative, SentimentLabel::Positive],
        risk_detection_enabled: true,
        disclaimer: DISCLAIMER.to_string(),
    })
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
    pub nlp_model: String,
    pub llm_provider: String,
}

/// Handle GET /health
pub async fn health_check(State(server): State<Arc<SolaceServer>>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        nlp_model: SENTIMENT_MODEL_NAME.to_string(),
        llm_provider: server.llm_provider().to_string(),
    })
}

/// Handle GET /metrics - Prometheus metrics endpoint
pub async fn metrics_endpoint() -> Result<Response, AppError> {
    let body = METRICS.render()?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response())
}

/// Application error wrapper for proper HTTP error responses
#[derive(Debug)]
pub enum AppError {
    /// Rejected input; the message is shown to the client
    BadRequest(String),
    /// Anything else; details stay in the logs
    Internal(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, error_type) = match self {
            AppError::BadRequest(message) => {
                tracing::info!(error = %message, "Rejected request");
                (StatusCode::BAD_REQUEST, message, "invalid_request_error")
            }
            AppError::Internal(e) => {
                let detail = format!("{:#}", e);
                tracing::error!(error = %detail, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error processing your message".to_string(),
                    "api_error",
                )
            }
        };

        let body = serde_json::json!({
            "error": {
                "message": message,
                "type": error_type
            }
        });

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    async fn exploding_handler() -> &'static str {
        panic!("handler blew up")
    }

    #[tokio::test]
    async fn test_handler_panic_becomes_generic_500() {
        let app = Router::new()
            .route("/boom", get(exploding_handler))
            .layer(CatchPanicLayer::custom(panic_response));

        let response = app
            .oneshot(Request::builder().uri("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"]["type"], "api_error");
        assert_eq!(
            body["error"]["message"],
            "Internal server error processing your message"
        );
    }

    #[tokio::test]
    async fn test_panic_response_hides_payload() {
        let response = panic_response(Box::new("secret detail".to_string()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(!String::from_utf8_lossy(&body).contains("secret detail"));
    }

    #[test]
    fn test_validation_error_is_bad_request() {
        let response = AppError::from(ValidationError::Empty).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_error_is_generic_500() {
        let response = AppError::from(anyhow::anyhow!("database password leaked")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_risk_response_flattens_indicators() {
        let assessment = crate::crisis::RiskAssessor::default().assess("I feel hopeless");
        let response = RiskResponse::from(assessment);
        assert!(!response.is_high_risk);
        assert_eq!(response.risk_indicators, vec!["extreme_despair: hopeless".to_string()]);
    }

    #[test]
    fn test_chat_request_history_defaults_empty() {
        let request: ChatRequest = serde_json::from_str(r#"{"message": "hi"}"#).unwrap();
        assert!(request.conversation_history.is_empty());

        let request: ChatRequest = serde_json::from_str(
            r#"{"message": "hi", "conversation_history": [
                {"role": "assistant", "content": "hello", "sentiment": "POSITIVE"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(request.conversation_history.len(), 1);
    }
}
