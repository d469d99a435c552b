//! The external signer/sender capability.
//!
//! The orchestrator only needs two things from a wallet: submit one
//! value-carrying transaction and answer whether a submitted transaction
//! is confirmed. Everything else (key custody, gas pricing, user prompts)
//! stays behind the trait.

use alloy_core::primitives::{Address, Bytes, U256};
use serde_json::Value;

use crate::{error::DeployError, rpc, session::TxHash};

/// An origin-chain transaction ready for signing and submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
}

/// Signing and sending capability provided by an external wallet.
#[allow(async_fn_in_trait)]
pub trait Signer {
    /// Sign and submit `tx`, returning its hash once the origin chain
    /// accepts it.
    ///
    /// User rejection, insufficient funds and transport errors are all
    /// reported as [`DeployError::SubmissionRejected`].
    async fn send(&self, tx: TransactionRequest) -> Result<TxHash, DeployError>;

    /// Whether the transaction has a successful receipt on the origin chain.
    async fn confirmed(&self, tx_hash: TxHash) -> Result<bool, DeployError>;
}

/// Signer driving an unlocked account on a JSON-RPC node via
/// `eth_sendTransaction`.
pub struct RpcSigner {
    client: reqwest::Client,
    rpc_url: String,
    from: Address,
}

impl RpcSigner {
    pub fn new(client: reqwest::Client, rpc_url: impl Into<String>, from: Address) -> Self {
        Self {
            client,
            rpc_url: rpc_url.into(),
            from,
        }
    }
}

impl Signer for RpcSigner {
    async fn send(&self, tx: TransactionRequest) -> Result<TxHash, DeployError> {
        let raw: String = rpc::json_rpc_call(
            &self.client,
            &self.rpc_url,
            "eth_sendTransaction",
            vec![serde_json::json!({
                "from": self.from.to_string(),
                "to": tx.to.to_string(),
                "data": tx.data.to_string(),
                "value": format!("0x{:x}", tx.value),
            })],
        )
        .await
        .map_err(|e| DeployError::SubmissionRejected(format!("{e:#}")))?;

        raw.parse::<TxHash>()
            .map_err(|e| DeployError::SubmissionRejected(format!("malformed tx hash: {e}")))
    }

    async fn confirmed(&self, tx_hash: TxHash) -> Result<bool, DeployError> {
        let receipt: Option<Value> = rpc::json_rpc_call(
            &self.client,
            &self.rpc_url,
            "eth_getTransactionReceipt",
            vec![serde_json::json!(tx_hash.to_string())],
        )
        .await
        .map_err(|e| DeployError::SubmissionRejected(format!("{e:#}")))?;

        let Some(receipt) = receipt else {
            return Ok(false);
        };

        match receipt.get("status").and_then(|s| s.as_str()) {
            Some("0x1") | None => Ok(true),
            Some(_) => Err(DeployError::SubmissionRejected(
                "origin transaction reverted".to_string(),
            )),
        }
    }
}
