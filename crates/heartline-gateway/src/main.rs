//! Heartline Gateway: JSON API in front of the voice coach pipeline.
//! Stateless: every request carries its own context; nothing is stored between calls.

mod settings;

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use heartline_core::{
    voice_commands, CoachError, NlpResponse, VoiceCoach, VoiceCommandCatalog, STARTER_COMMANDS,
    WELCOME_MESSAGE,
};
use serde::Serialize;
use serde_json::Value;
use settings::GatewayConfig;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub const GATEWAY_VERSION: &str = env!("CARGO_PKG_VERSION");

struct AppState {
    config: GatewayConfig,
    coach: VoiceCoach,
}

type ApiError = (StatusCode, Json<Value>);

fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": message.into() })),
    )
}

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[heartline-gateway] .env not loaded: {} (using system environment)", e);
    }

    let config = match GatewayConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("[heartline-gateway] Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = config.bind_addr();
    let app_name = config.app_name.clone();
    let state = Arc::new(AppState {
        config,
        coach: VoiceCoach::new(),
    });
    let app = build_app(state);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(target: "heartline::gateway", "Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    tracing::info!(target: "heartline::gateway", "{} v{} listening on {}", app_name, GATEWAY_VERSION, addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(target: "heartline::gateway", "Server error: {}", e);
    }
}

fn build_app(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors_origins);
    Router::new()
        .route("/health", get(health))
        .route("/api/status", get(status))
        .route("/api/voice/process-command", post(process_command))
        .route("/api/voice/voice-commands", get(list_voice_commands))
        .route(
            "/api/voice/start-conversation/:patient_id",
            post(start_conversation),
        )
        .with_state(state)
        .layer(axum::middleware::from_fn(log_requests))
        .layer(cors)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o.trim()) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(target: "heartline::gateway", "Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();
    if parsed.is_empty() {
        base.allow_origin(Any)
    } else {
        base.allow_origin(AllowOrigin::list(parsed))
    }
}

async fn log_requests(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();
    let response = next.run(request).await;
    tracing::info!(
        target: "heartline::gateway",
        "{} {} -> {} ({} ms)",
        method,
        path,
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    response
}

async fn health() -> &'static str {
    "OK"
}

async fn status(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(serde_json::json!({
        "app_name": state.config.app_name,
        "gateway_version": GATEWAY_VERSION,
        "core_version": heartline_core::version(),
    }))
}

/// POST /api/voice/process-command: `{ text, context?, patient_id? }` -> NlpResponse.
async fn process_command(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<NlpResponse>, ApiError> {
    let Json(body) = body.map_err(|e| bad_request(e.body_text()))?;
    match state.coach.process_request(body) {
        Ok(response) => Ok(Json(response)),
        Err(CoachError::InvalidRequest(msg)) => {
            tracing::warn!(target: "heartline::gateway", "Rejected voice command: {}", msg);
            Err(bad_request(msg))
        }
    }
}

async fn list_voice_commands() -> Json<VoiceCommandCatalog> {
    Json(voice_commands())
}

#[derive(Serialize)]
struct StartConversationResponse {
    conversation_id: String,
    patient_id: String,
    started_at: String,
    welcome_message: &'static str,
    suggested_commands: &'static [&'static str],
}

/// POST /api/voice/start-conversation/:patient_id: greeting and opener suggestions.
/// No session is stored; the caller keeps history and sends it back as context.
async fn start_conversation(Path(patient_id): Path<String>) -> Json<StartConversationResponse> {
    let conversation_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(
        target: "heartline::gateway",
        "Conversation {} started for patient {}",
        conversation_id,
        patient_id
    );
    Json(StartConversationResponse {
        conversation_id,
        patient_id,
        started_at: chrono::Utc::now().to_rfc3339(),
        welcome_message: WELCOME_MESSAGE,
        suggested_commands: STARTER_COMMANDS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_app() -> Router {
        build_app(Arc::new(AppState {
            config: GatewayConfig {
                app_name: "Test Coach".to_string(),
                ..GatewayConfig::default()
            },
            coach: VoiceCoach::new(),
        }))
    }

    async fn body_json(res: Response) -> Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let res = test_app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_status_reports_app_name() {
        let req = Request::builder().uri("/api/status").body(Body::empty()).unwrap();
        let res = test_app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json = body_json(res).await;
        assert_eq!(json["app_name"], "Test Coach");
        assert_eq!(json["gateway_version"], GATEWAY_VERSION);
    }

    #[tokio::test]
    async fn test_process_command_show_risk() {
        let req = post_json(
            "/api/voice/process-command",
            serde_json::json!({
                "text": "What is my heart attack risk",
                "context": {
                    "risk_data": { "heart_attack": { "probability": 0.44, "risk_level": "Medium" } }
                }
            }),
        );
        let res = test_app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json = body_json(res).await;
        assert_eq!(json["intent"], "show_risk");
        assert_eq!(json["priority"], "medium");
        assert_eq!(json["entities"]["condition"], "heart_attack");
        assert_eq!(json["should_speak"], true);
        assert!(json["response_text"].as_str().unwrap().contains("44"));
    }

    #[tokio::test]
    async fn test_process_command_emergency_without_context() {
        let req = post_json(
            "/api/voice/process-command",
            serde_json::json!({ "text": "I need emergency help" }),
        );
        let res = test_app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json = body_json(res).await;
        assert_eq!(json["intent"], "emergency_help");
        assert_eq!(json["priority"], "critical");
        assert_eq!(json["suggested_actions"][0], "emergency_contact");
    }

    #[tokio::test]
    async fn test_process_command_rejects_non_string_text() {
        let req = post_json(
            "/api/voice/process-command",
            serde_json::json!({ "text": ["not", "a", "string"] }),
        );
        let res = test_app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let json = body_json(res).await;
        assert!(json["error"].as_str().unwrap().contains("text"));
    }

    #[tokio::test]
    async fn test_process_command_rejects_malformed_json() {
        let req = Request::builder()
            .method("POST")
            .uri("/api/voice/process-command")
            .header("content-type", "application/json")
            .body(Body::from("{ not json"))
            .unwrap();
        let res = test_app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_voice_commands_catalog() {
        let req = Request::builder()
            .uri("/api/voice/voice-commands")
            .body(Body::empty())
            .unwrap();
        let res = test_app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json = body_json(res).await;
        for key in ["risk_queries", "explanations", "actions", "navigation", "emergency"] {
            assert!(json[key].as_array().map(|a| !a.is_empty()).unwrap_or(false), "{}", key);
        }
    }

    #[tokio::test]
    async fn test_start_conversation() {
        let req = Request::builder()
            .method("POST")
            .uri("/api/voice/start-conversation/patient-42")
            .body(Body::empty())
            .unwrap();
        let res = test_app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json = body_json(res).await;
        assert_eq!(json["patient_id"], "patient-42");
        assert_eq!(json["conversation_id"].as_str().unwrap().len(), 36);
        assert_eq!(json["suggested_commands"].as_array().unwrap().len(), STARTER_COMMANDS.len());
    }

    #[test]
    fn cors_layer_skips_invalid_origins() {
        // Builds without panicking on a bad header value.
        let _ = cors_layer(&["https://app.example.com".to_string(), "bad\norigin".to_string()]);
    }
}
