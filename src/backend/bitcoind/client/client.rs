use std::time::Duration;

use anyhow::{anyhow, Result};
use bitcoin::{absolute::Height, BlockHash};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::constants::RPC_REQUEST_ID;

use super::structs::{BlockResponse, RpcRequest, RpcResponse};

const RPC_TIMEOUT: Duration = Duration::from_secs(30);

/// JSON-RPC client for a Bitcoin Core node.
#[derive(Clone, Debug)]
pub struct BitcoindClient {
    http: reqwest::Client,
    url: String,
    user: String,
    pass: String,
}

impl BitcoindClient {
    pub fn new(url: String, user: String, pass: String) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(RPC_TIMEOUT).build()?;

        Ok(BitcoindClient {
            http,
            url,
            user,
            pass,
        })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: serde_json::Value) -> Result<T> {
        let body = RpcRequest {
            jsonrpc: "1.0",
            id: RPC_REQUEST_ID,
            method,
            params,
        };

        let res = self
            .http
            .post(&self.url)
            .basic_auth(&self.user, Some(&self.pass))
            .json(&body)
            .send()
            .await?;

        // bitcoind answers rpc errors with a non 2xx status and a json body
        let res: RpcResponse<T> = res.json().await?;

        if let Some(err) = res.error {
            return Err(anyhow!(
                "{} failed with code {}: {}",
                method,
                err.code,
                err.message
            ));
        }

        res.result
            .ok_or_else(|| anyhow!("{} returned no result", method))
    }

    pub async fn block_count(&self) -> Result<Height> {
        let count: u32 = self.call("getblockcount", json!([])).await?;
        Ok(Height::from_consensus(count)?)
    }

    pub async fn block_hash(&self, block_height: Height) -> Result<BlockHash> {
        self.call("getblockhash", json!([block_height.to_consensus_u32()]))
            .await
    }

    /// Full block with previous outputs attached to every input.
    pub async fn block(&self, block_hash: &BlockHash) -> Result<BlockResponse> {
        self.call("getblock", json!([block_hash.to_string(), 3]))
            .await
    }
}
