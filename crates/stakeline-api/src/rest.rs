use axum::{
    extract::State,
    http::{header, Method},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use stakeline_common::utils::{current_timestamp, format_timestamp};
use stakeline_staking::{DelegationService, RoundStatusEstimator};

use crate::delegation_endpoints::create_delegation_router;
use crate::health::HealthService;
use crate::metrics::MetricsService;
use crate::protocol_endpoints::create_protocol_router;
use crate::staking_endpoints::create_staking_router;
use crate::types::{ApiResponse, HealthResponse, StatusResponse};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Health check service
    pub health: Arc<HealthService>,
    /// Metrics service
    pub metrics: Arc<MetricsService>,
    /// Application start time
    pub start_time: Instant,
    /// Service name
    pub service_name: String,
    /// Service version
    pub version: String,
    /// Validator snapshot, previews, yields and bonding manager calls
    pub delegation: Arc<DelegationService>,
    /// Round timing
    pub rounds: Arc<RoundStatusEstimator>,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Service name
    pub service_name: String,
    /// Service version
    pub version: String,
    /// Enable metrics collection
    pub enable_metrics: bool,
    /// API path prefix (optional)
    pub path_prefix: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3001)),
            service_name: "stakeline-api".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            enable_metrics: true,
            path_prefix: Some("/api".to_string()),
        }
    }
}

/// API server
pub struct ApiServer {
    /// Server configuration
    config: ApiConfig,
    /// Application state
    state: AppState,
}

impl ApiServer {
    pub fn new(
        config: ApiConfig,
        delegation: Arc<DelegationService>,
        rounds: Arc<RoundStatusEstimator>,
    ) -> Self {
        let state = AppState {
            health: Arc::new(HealthService::new()),
            metrics: Arc::new(MetricsService::new()),
            start_time: Instant::now(),
            service_name: config.service_name.clone(),
            version: config.version.clone(),
            delegation,
            rounds,
        };

        Self { config, state }
    }

    /// Get a reference to the health service
    pub fn health(&self) -> Arc<HealthService> {
        self.state.health.clone()
    }

    /// Get a reference to the metrics service
    pub fn metrics(&self) -> Arc<MetricsService> {
        self.state.metrics.clone()
    }

    /// Start the API server
    pub async fn start(&self) -> anyhow::Result<()> {
        self.serve(std::future::pending()).await
    }

    /// Serve until `shutdown` resolves
    pub async fn serve<F>(&self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        tracing::info!("Starting {} API server on {}", self.config.service_name, self.config.bind_addr);

        let router = self.router();
        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!("Listening on {}", self.config.bind_addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("API server stopped");
        Ok(())
    }

    /// Create the API router
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
            .allow_origin(Any);

        let mut router = Router::new()
            .route("/health", get(health_handler))
            .route("/status", get(status_handler));

        if self.config.enable_metrics {
            router = router.route("/metrics", get(metrics_handler));
        }

        router = router
            .merge(create_staking_router())
            .merge(create_delegation_router())
            .merge(create_protocol_router());

        if let Some(prefix) = self.config.path_prefix.as_deref().filter(|p| *p != "/" && !p.is_empty()) {
            router = Router::new().nest(prefix, router);
        }

        router
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }
}

/// Health check handler
async fn health_handler(State(state): State<AppState>) -> axum::Json<HealthResponse> {
    let response = state.health.check_all().await;
    axum::Json(response)
}

/// Status handler
async fn status_handler(State(state): State<AppState>) -> axum::Json<ApiResponse<StatusResponse>> {
    let mut additional = std::collections::HashMap::new();
    additional.insert(
        "averageBlockTime".to_string(),
        serde_json::json!(state.rounds.average_block_time()),
    );

    let status = StatusResponse {
        name: state.service_name.clone(),
        version: state.version.clone(),
        uptime: state.start_time.elapsed().as_secs(),
        timestamp: format_timestamp(current_timestamp()),
        additional,
    };

    axum::Json(ApiResponse::success(status))
}

/// Metrics handler
async fn metrics_handler(State(state): State<AppState>) -> axum::Json<serde_json::Value> {
    let metrics = state.metrics.get_metrics().await;
    axum::Json(metrics)
}
