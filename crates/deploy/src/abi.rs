//! Minimal ABI call encoding for the deterministic-deployment factory.
//!
//! The factory interface only needs a handful of parameter shapes
//! (`address`, `uint256`, `bool`, `bytes`, `uint256[]`), so calls are
//! encoded by hand with the standard head/tail layout instead of pulling
//! in a full ABI code generator.

use alloy_core::primitives::{Address, Bytes, U256, keccak256};

/// A single ABI parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Uint(U256),
    Address(Address),
    Bool(bool),
    Bytes(Vec<u8>),
    UintArray(Vec<U256>),
}

impl Token {
    /// Dynamic tokens are encoded in the tail, with an offset in the head.
    fn is_dynamic(&self) -> bool {
        matches!(self, Token::Bytes(_) | Token::UintArray(_))
    }

    /// Encode the tail section of a dynamic token. Empty for static ones.
    fn tail(&self) -> Vec<u8> {
        match self {
            Token::Bytes(data) => {
                let mut out = uint_word(&U256::from(data.len())).to_vec();
                out.extend_from_slice(data);
                let pad = (32 - data.len() % 32) % 32;
                out.resize(out.len() + pad, 0);
                out
            }
            Token::UintArray(items) => {
                let mut out = uint_word(&U256::from(items.len())).to_vec();
                for item in items {
                    out.extend_from_slice(&uint_word(item));
                }
                out
            }
            _ => Vec::new(),
        }
    }
}

/// Big-endian 32-byte word for an unsigned integer.
fn uint_word(value: &U256) -> [u8; 32] {
    value.to_be_bytes::<32>()
}

/// Left-padded 32-byte word for an address.
fn address_word(address: &Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_slice());
    word
}

/// First four bytes of the keccak-256 hash of the canonical signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Encode a function call: selector followed by head/tail parameter encoding.
///
/// Offsets in the head are measured from the start of the parameter area
/// (right after the selector), per the ABI spec.
pub fn encode_call(signature: &str, tokens: &[Token]) -> Bytes {
    let head_len = 32 * tokens.len();
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for token in tokens {
        if token.is_dynamic() {
            head.extend_from_slice(&uint_word(&U256::from(head_len + tail.len())));
            tail.extend_from_slice(&token.tail());
        } else {
            let word = match token {
                Token::Uint(value) => uint_word(value),
                Token::Address(address) => address_word(address),
                Token::Bool(flag) => uint_word(&U256::from(*flag as u8)),
                _ => unreachable!("dynamic tokens are handled above"),
            };
            head.extend_from_slice(&word);
        }
    }

    let mut out = selector(signature).to_vec();
    out.extend_from_slice(&head);
    out.extend_from_slice(&tail);
    Bytes::from(out)
}
