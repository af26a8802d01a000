use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::scoring::{LoanApplication, RiskModel};
use crate::telemetry::{StatsSnapshot, TelemetryStore};

#[derive(Clone)]
pub struct ApiState {
    pub model: Arc<RiskModel>,
    pub telemetry: Arc<TelemetryStore>,
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    status: String,
}

#[derive(Debug, Serialize)]
struct PredictResponse {
    risk_score: u32,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    detail: String,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(status))
        .route("/predict", post(predict))
        .route("/api/stats", get(stats))
        .with_state(state)
        .layer(cors_layer())
}

pub async fn serve(addr: String, state: ApiState) -> Result<(), Box<dyn std::error::Error>> {
    let app = router(state);

    let addr: SocketAddr = addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "LoanSphere AI Service Online".to_string(),
    })
}

async fn predict(
    State(state): State<ApiState>,
    Json(application): Json<LoanApplication>,
) -> Result<Json<PredictResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.model.score(&application) {
        Ok(risk_score) => {
            state.telemetry.record_scored().await;
            Ok(Json(PredictResponse { risk_score }))
        }
        Err(error) => {
            state.telemetry.record_failed().await;
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    detail: error.to_string(),
                }),
            ))
        }
    }
}

async fn stats(State(state): State<ApiState>) -> Json<StatsSnapshot> {
    Json(state.telemetry.snapshot().await)
}

fn cors_layer() -> CorsLayer {
    let allowed = std::env::var("LOANSPHERE_CORS_ORIGIN")
        .unwrap_or_else(|_| "http://localhost:5173,http://127.0.0.1:5173".to_string());

    let cors = if allowed.trim() == "*" {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = allowed
            .split(',')
            .filter_map(|origin| origin.trim().parse::<HeaderValue>().ok())
            .collect::<Vec<_>>();
        CorsLayer::new().allow_origin(AllowOrigin::list(origins))
    };

    cors.allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}
