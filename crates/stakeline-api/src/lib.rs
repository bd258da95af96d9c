// src/lib.rs

//! stakeline-api - HTTP API for delegated staking on the Livepeer protocol
//!
//! Serves the validator snapshot, position hints, active-set previews, yield
//! estimates, bonding manager calls, and round timing.

pub mod delegation_endpoints;
pub mod contracts;
pub mod eth_client;
pub mod health;
pub mod metrics;
pub mod price_client;
pub mod protocol_endpoints;
pub mod rest;
pub mod server;
pub mod staking_endpoints;
pub mod subgraph_client;
pub mod types;
pub mod wallet_client;

pub use health::HealthService;
pub use metrics::MetricsService;
pub use rest::{ApiConfig, ApiServer, AppState};
pub use server::{build_services, run};
pub use types::{ApiError, ApiResponse, HealthCheckResult, HealthResponse, HealthStatus, StatusResponse};
