//! Hex helpers shared by the account, builder and CLI layers.

use alloy::hex;

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Decode a hex string, with or without `0x`.
///
/// Odd-length input is left-padded with a zero nibble, so `"0xabc"` decodes to `[0x0a, 0xbc]`.
pub fn decode_hex(s: &str) -> BlockchainResult<Vec<u8>> {
    let digits = s.strip_prefix("0x").unwrap_or(s);

    let decoded = if digits.len() % 2 != 0 {
        hex::decode(format!("0{digits}"))
    } else {
        hex::decode(digits)
    };

    decoded.map_err(|e| BlockchainError::InvalidHex(format!("{s:?}: {e}")))
}

/// Lower-case hex with a `0x` prefix.
pub fn encode_hex(bytes: &[u8]) -> String {
    hex::encode_prefixed(bytes)
}

/// Hex-encode the UTF-8 bytes of `text`.
pub fn text_to_hex(text: &str) -> String {
    encode_hex(text.as_bytes())
}
