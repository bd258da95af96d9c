// src/wallet_client.rs

use alloy::primitives::Bytes;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use stakeline_staking::{CallSubmitter, ContractCall, Result, StakingError};

use crate::contracts;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendTransactionRequest<'a> {
    to: &'a str,
    data: Bytes,
    value: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendTransactionResponse {
    #[serde(default, alias = "hash")]
    transaction_hash: Option<String>,
}

/// Wallet custody API client. The custody service signs and broadcasts.
#[derive(Debug, Clone)]
pub struct WalletClient {
    base_url: String,
    app_id: String,
    app_secret: String,
    client: reqwest::Client,
}

impl WalletClient {
    pub fn new(base_url: &str, app_id: &str, app_secret: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            app_id: app_id.to_string(),
            app_secret: app_secret.to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, wallet_id: &str) -> String {
        format!("{}/wallets/{}/transactions", self.base_url, wallet_id)
    }
}

#[async_trait]
impl CallSubmitter for WalletClient {
    async fn submit(&self, wallet_id: &str, call: &ContractCall) -> Result<String> {
        if wallet_id.trim().is_empty() {
            return Err(StakingError::Validation("wallet id is empty".into()));
        }

        let data = contracts::encode_call(call).map_err(|e| StakingError::Validation(format!("{:#}", e)))?;
        let request = SendTransactionRequest {
            to: &call.to,
            data,
            value: "0",
        };

        let response = self
            .client
            .post(self.url(wallet_id))
            .basic_auth(&self.app_id, Some(&self.app_secret))
            .json(&request)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| StakingError::Submission(e.to_string()))?
            .json::<SendTransactionResponse>()
            .await
            .map_err(|e| StakingError::Submission(format!("invalid wallet response: {}", e)))?;

        let hash = response
            .transaction_hash
            .ok_or_else(|| StakingError::Submission("wallet response has no transaction hash".into()))?;
        info!(wallet_id, function = %call.function, %hash, "Submitted contract call");
        Ok(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_accepts_either_hash_field() {
        let a: SendTransactionResponse = serde_json::from_str(r#"{"transactionHash":"0x1"}"#).unwrap();
        let b: SendTransactionResponse = serde_json::from_str(r#"{"hash":"0x2"}"#).unwrap();
        assert_eq!(a.transaction_hash.as_deref(), Some("0x1"));
        assert_eq!(b.transaction_hash.as_deref(), Some("0x2"));
    }

    #[tokio::test]
    async fn test_empty_wallet_id_rejected() {
        let client = WalletClient::new("http://127.0.0.1:9", "app", "secret");
        let call = ContractCall {
            to: "0x35Bcf3c30594191d53231E4FF333E8A770453e40".into(),
            function: "unbondWithHint".into(),
            signature: "unbondWithHint(uint256,address,address)".into(),
            args: vec![],
        };
        assert!(matches!(
            client.submit(" ", &call).await,
            Err(StakingError::Validation(_))
        ));
    }
}
