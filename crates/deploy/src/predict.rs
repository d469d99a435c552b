//! Deterministic deployment address prediction.
//!
//! The factory deploys bytecode with CREATE2, so the resulting address is a
//! pure function of (factory address, salt, bytecode). As long as the same
//! factory contract sits at the same address on every destination chain,
//! one prediction is valid everywhere; the predictor therefore queries a
//! single chain, not one per destination.

use alloy_core::primitives::{Address, Bytes, U256, keccak256};

use crate::{abi, error::DeployError, rpc};

/// Parse a caller-supplied salt string into a fixed-width unsigned integer.
///
/// Accepts decimal or 0x-prefixed hex. An empty or malformed salt is an
/// [`DeployError::InvalidInput`].
pub fn parse_salt(raw: &str) -> Result<U256, DeployError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(DeployError::InvalidInput(
            "salt must not be empty".to_string(),
        ));
    }
    raw.parse::<U256>().map_err(|e| {
        DeployError::InvalidInput(format!("salt is not a valid unsigned integer: {e}"))
    })
}

/// ABI encoding of the salt as a single `uint256` word.
///
/// This is the `bytes` value the factory expects for both `computeAddress`
/// and `xDeployer`.
pub fn salt_word(salt: U256) -> [u8; 32] {
    salt.to_be_bytes::<32>()
}

/// Pure CREATE2 address derivation:
/// `keccak256(0xff ++ factory ++ salt ++ keccak256(bytecode))[12..]`.
///
/// Calling this twice with identical inputs always yields the same address.
pub fn create2_address(factory: Address, salt: U256, bytecode: &[u8]) -> Address {
    let mut preimage = Vec::with_capacity(1 + 20 + 32 + 32);
    preimage.push(0xff);
    preimage.extend_from_slice(factory.as_slice());
    preimage.extend_from_slice(&salt_word(salt));
    preimage.extend_from_slice(keccak256(bytecode).as_slice());
    Address::from_slice(&keccak256(&preimage)[12..])
}

/// Read-only address prediction capability.
#[allow(async_fn_in_trait)]
pub trait Predictor {
    /// Predict the deployment address for `(salt, bytecode)`.
    async fn predict(&self, salt: U256, bytecode: &Bytes) -> Result<Address, DeployError>;
}

/// Predictor backed by an `eth_call` to the factory's `computeAddress`.
pub struct RpcPredictor {
    client: reqwest::Client,
    rpc_url: String,
    factory: Address,
}

impl RpcPredictor {
    pub fn new(client: reqwest::Client, rpc_url: impl Into<String>, factory: Address) -> Self {
        Self {
            client,
            rpc_url: rpc_url.into(),
            factory,
        }
    }
}

impl Predictor for RpcPredictor {
    async fn predict(&self, salt: U256, bytecode: &Bytes) -> Result<Address, DeployError> {
        if bytecode.is_empty() {
            return Err(DeployError::InvalidInput(
                "bytecode must not be empty".to_string(),
            ));
        }

        let data = abi::encode_call(
            "computeAddress(bytes,bytes)",
            &[
                abi::Token::Bytes(salt_word(salt).to_vec()),
                abi::Token::Bytes(bytecode.to_vec()),
            ],
        );

        let returned: String = rpc::json_rpc_call(
            &self.client,
            &self.rpc_url,
            "eth_call",
            vec![
                serde_json::json!({
                    "to": self.factory.to_string(),
                    "data": data.to_string(),
                }),
                serde_json::json!("latest"),
            ],
        )
        .await
        .map_err(|e| DeployError::Prediction(format!("{e:#}")))?;

        decode_address_word(&returned)
    }
}

/// Decode a single ABI-encoded address return value.
fn decode_address_word(raw: &str) -> Result<Address, DeployError> {
    let bytes = hex::decode(raw.trim_start_matches("0x"))
        .map_err(|e| DeployError::Prediction(format!("malformed return data: {e}")))?;
    if bytes.len() < 32 {
        return Err(DeployError::Prediction(format!(
            "return data too short: {} bytes",
            bytes.len()
        )));
    }
    Ok(Address::from_slice(&bytes[12..32]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory() -> Address {
        "0x4e59b44847b379578588920cA78FbF26c0B4956C"
            .parse()
            .unwrap()
    }

    #[test]
    fn test_parse_salt() {
        assert_eq!(parse_salt("42").unwrap(), U256::from(42u64));
        assert_eq!(parse_salt(" 7 ").unwrap(), U256::from(7u64));
        assert_eq!(parse_salt("0x10").unwrap(), U256::from(16u64));
        assert!(matches!(
            parse_salt(""),
            Err(DeployError::InvalidInput(_))
        ));
        assert!(matches!(
            parse_salt("not-a-number"),
            Err(DeployError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_salt_word_is_big_endian_uint256() {
        let word = salt_word(U256::from(42u64));
        assert_eq!(word[31], 42);
        assert!(word[..31].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_create2_is_deterministic() {
        let bytecode = vec![0xAA, 0xBB];
        let first = create2_address(factory(), U256::from(42u64), &bytecode);
        let second = create2_address(factory(), U256::from(42u64), &bytecode);
        assert_eq!(first, second, "same inputs must yield the same address");
    }

    #[test]
    fn test_create2_depends_on_all_inputs() {
        let bytecode = vec![0xAA, 0xBB];
        let base = create2_address(factory(), U256::from(42u64), &bytecode);

        let other_salt = create2_address(factory(), U256::from(43u64), &bytecode);
        assert_ne!(base, other_salt);

        let other_code = create2_address(factory(), U256::from(42u64), &[0xAA, 0xBC]);
        assert_ne!(base, other_code);

        let other_factory: Address = "0x0000000000000000000000000000000000000001"
            .parse()
            .unwrap();
        assert_ne!(base, create2_address(other_factory, U256::from(42u64), &bytecode));
    }

    #[test]
    fn test_decode_address_word() {
        let addr = decode_address_word(
            "0x00000000000000000000000070997970c51812dc3a010c7d01b50e0d17dc79c8",
        )
        .unwrap();
        assert_eq!(
            addr,
            "0x70997970C51812dc3A010C7d01b50e0d17dc79C8"
                .parse::<Address>()
                .unwrap()
        );

        assert!(decode_address_word("0x1234").is_err());
        assert!(decode_address_word("0xzz").is_err());
    }

    #[tokio::test]
    async fn test_rpc_predictor_rejects_empty_bytecode_before_any_call() {
        // The URL is never contacted: validation fails first.
        let predictor = RpcPredictor::new(
            reqwest::Client::new(),
            "http://127.0.0.1:1",
            factory(),
        );
        let err = predictor
            .predict(U256::from(1u64), &Bytes::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DeployError::InvalidInput(_)));
    }
}
