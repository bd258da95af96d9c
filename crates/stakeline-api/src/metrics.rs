use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use serde_json::Value;

/// Request counters and last-seen values exposed on `/metrics`
#[derive(Debug, Default)]
pub struct MetricsService {
    metrics: Arc<RwLock<HashMap<String, Value>>>,
}

impl MetricsService {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_metric(&self, key: &str, value: Value) {
        let mut metrics = self.metrics.write().await;
        metrics.insert(key.to_string(), value);
    }

    pub async fn get_metric(&self, key: &str) -> Option<Value> {
        let metrics = self.metrics.read().await;
        metrics.get(key).cloned()
    }

    /// Bump an integer counter, creating it at 1
    pub async fn increment(&self, key: &str) {
        let mut metrics = self.metrics.write().await;
        let next = metrics.get(key).and_then(Value::as_u64).unwrap_or(0) + 1;
        metrics.insert(key.to_string(), Value::from(next));
    }

    pub async fn get_metrics(&self) -> Value {
        let metrics = self.metrics.read().await;
        serde_json::to_value(&*metrics).unwrap_or(Value::Object(serde_json::Map::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_counters() {
        let metrics = MetricsService::new();
        metrics.increment("requests.staking").await;
        metrics.increment("requests.staking").await;
        metrics.set_metric("round.current", Value::from(42)).await;

        assert_eq!(metrics.get_metric("requests.staking").await, Some(Value::from(2)));
        let all = metrics.get_metrics().await;
        assert_eq!(all["round.current"], 42);
    }
}
