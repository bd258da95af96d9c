// src/health.rs

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

use crate::types::{HealthCheckResult, HealthResponse, HealthStatus};

pub type HealthCheckFn = Arc<dyn Fn() -> bool + Send + Sync>;
pub type AsyncHealthCheckFn =
    Arc<dyn Fn() -> Pin<Box<dyn Future<Output = HealthCheckResult> + Send>> + Send + Sync>;

/// Wraps an async closure as an [`AsyncHealthCheckFn`].
pub fn async_check<F, Fut>(check: F) -> AsyncHealthCheckFn
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HealthCheckResult> + Send + 'static,
{
    Arc::new(move || Box::pin(check()) as Pin<Box<dyn Future<Output = HealthCheckResult> + Send>>)
}

enum Check {
    Sync(HealthCheckFn),
    Async(AsyncHealthCheckFn),
}

pub struct HealthService {
    checks: RwLock<HashMap<String, Arc<Check>>>,
    start_time: Instant,
}

impl HealthService {
    pub fn new() -> Self {
        Self {
            checks: RwLock::new(HashMap::new()),
            start_time: Instant::now(),
        }
    }

    pub async fn register(&self, name: &str, check: HealthCheckFn) {
        self.checks
            .write()
            .await
            .insert(name.to_string(), Arc::new(Check::Sync(check)));
    }

    pub async fn register_async(&self, name: &str, check: AsyncHealthCheckFn) {
        self.checks
            .write()
            .await
            .insert(name.to_string(), Arc::new(Check::Async(check)));
    }

    pub async fn unregister(&self, name: &str) {
        self.checks.write().await.remove(name);
    }

    pub fn uptime(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Healthy when every check passes, degraded when at least one passes or
    /// reports degraded, unhealthy otherwise. No checks counts as healthy.
    pub async fn check_all(&self) -> HealthResponse {
        // release the lock before awaiting any check
        let checks: Vec<(String, Arc<Check>)> = {
            let checks = self.checks.read().await;
            checks.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
        };

        let mut results = HashMap::new();
        let mut all_healthy = true;
        let mut any_healthy = false;

        for (name, check) in checks {
            let result = match check.as_ref() {
                Check::Sync(check) => {
                    if check() {
                        HealthCheckResult::healthy("Check passed")
                    } else {
                        HealthCheckResult::unhealthy("Check failed")
                    }
                }
                Check::Async(check) => check().await,
            };

            match result.status {
                HealthStatus::Healthy => any_healthy = true,
                HealthStatus::Degraded => {
                    all_healthy = false;
                    any_healthy = true;
                }
                HealthStatus::Unhealthy => all_healthy = false,
            }

            results.insert(name, result);
        }

        let status = if all_healthy {
            HealthStatus::Healthy
        } else if any_healthy {
            HealthStatus::Degraded
        } else {
            HealthStatus::Unhealthy
        };

        HealthResponse {
            status,
            checks: results,
            uptime: self.uptime(),
        }
    }
}

impl Default for HealthService {
    fn default() -> Self {
        Self::new()
    }
}
