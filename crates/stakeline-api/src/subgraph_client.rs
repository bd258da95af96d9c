// src/subgraph_client.rs

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use stakeline_common::{RawValidator, Validator};
use stakeline_staking::{Result, StakingError, ValidatorSource};

const ACTIVE_TRANSCODERS_QUERY: &str = "{ transcoders(where: { active: true }, orderBy: totalStake, orderDirection: desc, first: 1000) { id totalStake } }";

#[derive(Debug, Deserialize)]
struct GraphResponse {
    #[serde(default)]
    data: Option<TranscoderData>,
    #[serde(default)]
    errors: Option<Vec<GraphError>>,
}

#[derive(Debug, Deserialize)]
struct TranscoderData {
    #[serde(default)]
    transcoders: Vec<RawValidator>,
}

#[derive(Debug, Deserialize)]
struct GraphError {
    message: String,
}

/// Reads the active validator set from the protocol subgraph
#[derive(Debug, Clone)]
pub struct SubgraphClient {
    url: String,
    client: reqwest::Client,
}

impl SubgraphClient {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            client: reqwest::Client::new(),
        }
    }
}

/// Converts a GraphQL payload into validators. Malformed records are skipped.
pub fn parse_transcoders(body: &str) -> Result<Vec<Validator>> {
    let response: GraphResponse = serde_json::from_str(body)
        .map_err(|e| StakingError::ValidatorSource(format!("invalid subgraph response: {}", e)))?;

    if let Some(errors) = response.errors.filter(|e| !e.is_empty()) {
        let messages: Vec<_> = errors.into_iter().map(|e| e.message).collect();
        return Err(StakingError::ValidatorSource(messages.join("; ")));
    }

    let records = response
        .data
        .ok_or_else(|| StakingError::ValidatorSource("subgraph response has no data".into()))?
        .transcoders;

    let validators = records
        .into_iter()
        .filter_map(|raw| match Validator::try_from(raw) {
            Ok(validator) => Some(validator),
            Err(e) => {
                warn!("Skipping transcoder record: {}", e);
                None
            }
        })
        .collect();
    Ok(validators)
}

#[async_trait]
impl ValidatorSource for SubgraphClient {
    async fn active_validators(&self) -> Result<Vec<Validator>> {
        let body = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({ "query": ACTIVE_TRANSCODERS_QUERY }))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| StakingError::ValidatorSource(e.to_string()))?
            .text()
            .await
            .map_err(|e| StakingError::ValidatorSource(e.to_string()))?;

        let validators = parse_transcoders(&body)?;
        debug!(count = validators.len(), "Fetched active transcoders");
        Ok(validators)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_transcoders() {
        let body = r#"{"data":{"transcoders":[
            {"id":"0xaaa","totalStake":"1500.25"},
            {"id":"0xbbb"},
            {"totalStake":"10"},
            {"id":"0xccc","totalStake":"not-a-number"}
        ]}}"#;

        let validators = parse_transcoders(body).unwrap();
        assert_eq!(validators.len(), 2);
        assert_eq!(validators[0].id, "0xaaa");
        assert_eq!(validators[1].total_stake, "0");
    }

    #[test]
    fn test_graphql_errors() {
        let body = r#"{"errors":[{"message":"indexer unavailable"}]}"#;
        match parse_transcoders(body) {
            Err(StakingError::ValidatorSource(msg)) => assert!(msg.contains("indexer unavailable")),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(parse_transcoders(r#"{}"#).is_err());
    }
}
