// src/rpc.rs
use std::time::Duration;

use alloy::primitives::U256;
use async_trait::async_trait;
use reqwest::Client;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::models::TransferEvent;
use crate::parser::{self, Envelope};

pub const MAINNET_API: &str = "https://api.etherscan.io";
pub const SEPOLIA_API: &str = "https://api-sepolia.etherscan.io";
pub const SEPOLIA_CHAIN_ID: u64 = 11_155_111;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Where transfers and balances come from. Implementations report transport
/// and HTTP failures as errors and never retry.
#[async_trait]
pub trait LedgerSource: Send + Sync {
    /// Every transfer of `token` touching `address`, in no particular order
    async fn token_transfers(&self, address: &str, token: &str) -> Result<Vec<TransferEvent>>;

    async fn token_balance(&self, address: &str, token: &str) -> Result<U256>;

    async fn native_balance(&self, address: &str) -> Result<U256>;
}

/// Indexer host for a chain id
pub fn base_url_for_chain(chain_id: u64) -> &'static str {
    if chain_id == SEPOLIA_CHAIN_ID {
        SEPOLIA_API
    } else {
        MAINNET_API
    }
}

/// Client for an Etherscan-compatible `module=account` API
#[derive(Debug, Clone)]
pub struct EtherscanClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl EtherscanClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    async fn account_query(&self, params: &[(&str, &str)]) -> Result<Envelope> {
        let url = format!("{}/api", self.base_url);
        let action = params
            .iter()
            .find(|(k, _)| *k == "action")
            .map_or("?", |(_, v)| *v);
        info!("📡 Sending {} → {}", action, url);

        let resp = self
            .client
            .get(&url)
            .query(&[("module", "account")])
            .query(params)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            warn!("Indexer answered {} for {}", status, action);
            return Err(Error::UpstreamStatus(status.as_u16()));
        }

        let text = resp.text().await?;
        let envelope: Envelope = serde_json::from_str(&text)?;
        Ok(envelope)
    }
}

#[async_trait]
impl LedgerSource for EtherscanClient {
    async fn token_transfers(&self, address: &str, token: &str) -> Result<Vec<TransferEvent>> {
        let envelope = self
            .account_query(&[
                ("action", "tokentx"),
                ("address", address),
                ("contractaddress", token),
                ("sort", "asc"),
            ])
            .await?;
        let transfers = parser::decode_transfers(&envelope);
        info!("📩 {} transfers of {} for {}", transfers.len(), token, address);
        Ok(transfers)
    }

    async fn token_balance(&self, address: &str, token: &str) -> Result<U256> {
        let envelope = self
            .account_query(&[
                ("action", "tokenbalance"),
                ("contractaddress", token),
                ("address", address),
                ("tag", "latest"),
            ])
            .await?;
        Ok(parser::decode_quantity(&envelope))
    }

    async fn native_balance(&self, address: &str) -> Result<U256> {
        let envelope = self
            .account_query(&[("action", "balance"), ("address", address), ("tag", "latest")])
            .await?;
        Ok(parser::decode_quantity(&envelope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn picks_host_by_chain() {
        assert_eq!(base_url_for_chain(1), MAINNET_API);
        assert_eq!(base_url_for_chain(SEPOLIA_CHAIN_ID), SEPOLIA_API);
        assert_eq!(base_url_for_chain(137), MAINNET_API);
    }

    #[tokio::test]
    async fn fetches_token_transfers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api"))
            .and(query_param("module", "account"))
            .and(query_param("action", "tokentx"))
            .and(query_param("address", "0xwallet"))
            .and(query_param("contractaddress", "0xtoken"))
            .and(query_param("sort", "asc"))
            .and(query_param("apikey", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "1",
                "message": "OK",
                "result": [
                    { "timeStamp": "1700000000", "from": "0xaa", "to": "0xwallet", "value": "7" }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = EtherscanClient::new(server.uri(), "secret").unwrap();
        let transfers = client.token_transfers("0xwallet", "0xtoken").await.unwrap();
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].raw_amount, "7");
    }

    #[tokio::test]
    async fn error_text_result_is_empty() {
        let server = MockServer::start().await;
        Mock::given(path("/api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "0",
                "message": "NOTOK",
                "result": "Max rate limit reached"
            })))
            .mount(&server)
            .await;

        let client = EtherscanClient::new(server.uri(), "k").unwrap();
        assert!(client.token_transfers("0xw", "0xt").await.unwrap().is_empty());
        assert_eq!(client.native_balance("0xw").await.unwrap(), U256::ZERO);
    }

    #[tokio::test]
    async fn non_success_status_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(path("/api"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = EtherscanClient::new(server.uri(), "k").unwrap();
        let err = client.token_transfers("0xw", "0xt").await.unwrap_err();
        assert!(matches!(err, Error::UpstreamStatus(503)));
        assert!(err.is_upstream());
    }

    #[tokio::test]
    async fn unreadable_body_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(path("/api"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
            .mount(&server)
            .await;

        let client = EtherscanClient::new(server.uri(), "k").unwrap();
        let err = client.token_balance("0xw", "0xt").await.unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[tokio::test]
    async fn reads_balances() {
        let server = MockServer::start().await;
        Mock::given(path("/api"))
            .and(query_param("action", "tokenbalance"))
            .and(query_param("tag", "latest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "1", "message": "OK", "result": "2500000"
            })))
            .mount(&server)
            .await;
        Mock::given(path("/api"))
            .and(query_param("action", "balance"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "1", "message": "OK", "result": "1000000000000000000"
            })))
            .mount(&server)
            .await;

        let client = EtherscanClient::new(format!("{}/", server.uri()), "k").unwrap();
        assert_eq!(client.token_balance("0xw", "0xt").await.unwrap(), U256::from(2_500_000u64));
        assert_eq!(
            client.native_balance("0xw").await.unwrap(),
            U256::from(10u64.pow(18))
        );
    }
}
