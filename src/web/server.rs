use std::sync::Arc;
use axum::{
    Router,
    body::Bytes,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::error::HealthError;
use crate::health::engine::HealthEngine;
use crate::health::handler::HealthReport;
use crate::metrics;

/// HTTP front of the scoring engine
pub struct WebServer {
    engine: Arc<HealthEngine>,
    config: Arc<Config>,
}

#[derive(Clone)]
struct AppState {
    engine: Arc<HealthEngine>,
}

#[derive(Deserialize)]
struct JournalQuery {
    machine: Option<String>,
    limit: Option<usize>,
}

impl WebServer {
    pub fn new(engine: Arc<HealthEngine>, config: Arc<Config>) -> Self {
        Self { engine, config }
    }

    pub fn router(&self) -> Router {
        let state = AppState {
            engine: self.engine.clone(),
        };

        let app = Router::new()
            .route("/machine-health", post(machine_health))
            .route("/health", get(liveness))
            .route("/api/machines", get(api_machines))
            .route("/api/journal", get(api_journal))
            .route("/api/stats", get(api_stats))
            .route("/metrics", get(api_metrics))
            .with_state(state)
            .layer(TraceLayer::new_for_http());

        if self.config.web.cors {
            app.layer(CorsLayer::permissive())
        } else {
            app
        }
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        let addr = format!("{}:{}", self.config.web.address, self.config.web.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!("Scoring API listening on http://{}", addr);

        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}

/// Scoring endpoint. The body is read raw so that unparseable JSON gets the
/// same error body as a wrongly shaped one.
async fn machine_health(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<HealthReport>, HealthError> {
    state.engine.evaluate(&body).map(Json)
}

async fn liveness() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Threshold catalog API
async fn api_machines(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(state.engine.catalog())
}

/// Journal API with search
async fn api_journal(
    State(state): State<AppState>,
    Query(params): Query<JournalQuery>,
) -> Json<serde_json::Value> {
    let limit = params.limit.unwrap_or(100);
    let entries = state.engine.journal.search(params.machine.as_deref(), limit);
    Json(serde_json::json!({
        "entries": entries,
        "stats": state.engine.journal.get_stats(),
    }))
}

async fn api_stats(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(state.engine.stats())
}

async fn api_metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::render_metrics(&state.engine),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    async fn spawn_server() -> String {
        let config = Arc::new(Config::default());
        let engine = Arc::new(HealthEngine::new((*config).clone()).unwrap());
        let app = WebServer::new(engine, config).router();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn post_health(base: &str, body: Value) -> (u16, Value) {
        let response = reqwest::Client::new()
            .post(format!("{}/machine-health", base))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap())
    }

    #[tokio::test]
    async fn test_scores_machines() {
        let base = spawn_server().await;
        let (status, body) = post_health(
            &base,
            json!({
                "machines": {
                    "weldingRobot": { "errorRate": "0.5", "vibrationLevel": "4.0", "electrodeWear": "0.8" },
                    "assemblyLine": { "alignmentAccuracy": "0.5" }
                }
            }),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(
            body,
            json!({
                "factory": "91.44",
                "machineScores": { "weldingRobot": "82.87", "assemblyLine": "100.00" }
            })
        );
    }

    #[tokio::test]
    async fn test_empty_machines() {
        let base = spawn_server().await;
        let (status, body) = post_health(&base, json!({ "machines": {} })).await;
        assert_eq!(status, 200);
        assert_eq!(body, json!({ "factory": "0.00", "machineScores": {} }));
    }

    #[tokio::test]
    async fn test_invalid_bodies() {
        let base = spawn_server().await;
        for body in [json!({}), json!({ "machines": null })] {
            let (status, body) = post_health(&base, body).await;
            assert_eq!(status, 400);
            assert_eq!(body, json!({ "error": "Invalid input format" }));
        }

        let response = reqwest::Client::new()
            .post(format!("{}/machine-health", base))
            .body("{not json")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 400);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Invalid input format");
    }

    #[tokio::test]
    async fn test_operational_endpoints() {
        let base = spawn_server().await;
        post_health(&base, json!({ "machines": { "weldingRobot": { "errorRate": "0.05" } } })).await;

        let health: Value = reqwest::get(format!("{}/health", base)).await.unwrap().json().await.unwrap();
        assert_eq!(health["status"], "ok");

        let machines: Value = reqwest::get(format!("{}/api/machines", base)).await.unwrap().json().await.unwrap();
        assert_eq!(machines["machines"].as_array().unwrap().len(), 4);

        let journal: Value = reqwest::get(format!("{}/api/journal?machine=weldingRobot&limit=5", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(journal["entries"].as_array().unwrap().len(), 1);
        assert_eq!(journal["entries"][0]["factory"], "100.00");

        let stats: Value = reqwest::get(format!("{}/api/stats", base)).await.unwrap().json().await.unwrap();
        assert_eq!(stats["requests_total"], 1);

        let text = reqwest::get(format!("{}/metrics", base)).await.unwrap().text().await.unwrap();
        assert!(text.contains("factory_health_requests_total 1"));
    }
}
