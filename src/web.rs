//! Web server exposing the card analysis API.
//!
//! One endpoint: POST /api/analyze takes a card photo and returns the
//! flat price report. Free-tier callers are quota-limited per client IP;
//! entitled subscribers bypass the quota entirely.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::config::Config;
use crate::entitlement::EntitlementClient;
use crate::pipeline::Pipeline;
use crate::rate_limit::{RateLimitDecision, RateLimiter};

/// Shared application state
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    pipeline: Arc<Pipeline>,
    limiter: Arc<RateLimiter>,
    entitlement: Arc<EntitlementClient>,
}

/// POST /api/analyze request body
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest {
    /// Card photo as a data URL or https URL
    image: Option<String>,
    /// Billing customer id, when the caller claims a subscription
    customer_id: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// Client key for rate limiting: first proxy-forwarded address, then the
/// direct reverse-proxy header, else a shared bucket.
fn client_ip(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty());
    if let Some(ip) = forwarded {
        return ip.to_string();
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

fn rate_limit_headers(limit: u32, decision: &RateLimitDecision) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("x-ratelimit-limit", limit.to_string().parse().unwrap());
    headers.insert(
        "x-ratelimit-remaining",
        decision.remaining.to_string().parse().unwrap(),
    );
    headers.insert(
        "x-ratelimit-reset",
        decision.reset_at.to_string().parse().unwrap(),
    );
    headers
}

/// POST /api/analyze
async fn analyze_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<AnalyzeRequest>,
) -> Response {
    let Some(image) = request.image.filter(|i| !i.is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "No image provided");
    };

    let entitled = state
        .entitlement
        .is_unrestricted(request.customer_id.as_deref())
        .await;

    let mut quota_headers = HeaderMap::new();
    if !entitled {
        let ip = client_ip(&headers);
        let limit = state.config.free_tier_daily_limit;
        let decision = state.limiter.check(&ip, limit);
        quota_headers = rate_limit_headers(limit, &decision);
        if !decision.allowed {
            log::info!("Rate limit hit for {}", ip);
            return (
                StatusCode::TOO_MANY_REQUESTS,
                quota_headers,
                Json(json!({
                    "error": "Daily free limit reached. Try again tomorrow or upgrade.",
                    "resetAt": decision.reset_at,
                    "upgradeRequired": true,
                })),
            )
                .into_response();
        }
    }

    match state.pipeline.analyze_image(&image).await {
        Ok(report) => (StatusCode::OK, quota_headers, Json(report)).into_response(),
        Err(e) => {
            log::error!("Analysis failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

/// Build the API router
pub fn create_router(config: Config) -> Router {
    let state = AppState {
        pipeline: Arc::new(Pipeline::new(config.clone())),
        entitlement: Arc::new(EntitlementClient::new(
            &config.billing_base_url,
            &config.billing_api_key,
        )),
        limiter: Arc::new(RateLimiter::new()),
        config: Arc::new(config),
    };

    Router::new()
        .route("/api/analyze", post(analyze_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the web server (async)
pub async fn serve(config: Config, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(config);
    let addr = format!("0.0.0.0:{}", port);

    log::info!("Analysis API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
