//! Unsigned transaction construction from string-typed fields.
//!
//! # Fee shape
//! - Non-zero `max_priority_fee_per_gas` → EIP-1559 dynamic fee transaction
//!   (`gas_price` becomes the fee cap)
//! - Anything else → legacy transaction with `gas_price` as the flat price
//!
//! The shape is decided once in [`build`]; there is no mixed form.

use alloy::consensus::{TxEip1559, TxLegacy};
use alloy::primitives::{Address, Bytes, TxKind, U256};

use crate::blockchain::account::parse_address;
use crate::blockchain::codec::decode_hex;
use crate::blockchain::types::{BlockchainError, BlockchainResult, TxField};

/// Gas limit used when the caller leaves it empty (`eth_sendTransaction` default).
pub const DEFAULT_GAS_LIMIT: u64 = 90_000;

/// Transaction ready for signing, in exactly one fee shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsignedTransaction {
    Legacy(TxLegacy),
    DynamicFee(TxEip1559),
}

impl UnsignedTransaction {
    pub fn nonce(&self) -> u64 {
        match self {
            Self::Legacy(tx) => tx.nonce,
            Self::DynamicFee(tx) => tx.nonce,
        }
    }

    pub fn set_nonce(&mut self, nonce: u64) {
        match self {
            Self::Legacy(tx) => tx.nonce = nonce,
            Self::DynamicFee(tx) => tx.nonce = nonce,
        }
    }

    pub fn gas_limit(&self) -> u64 {
        match self {
            Self::Legacy(tx) => tx.gas_limit,
            Self::DynamicFee(tx) => tx.gas_limit,
        }
    }

    /// Flat gas price for legacy, fee cap for dynamic fee.
    pub fn max_fee_per_gas(&self) -> u128 {
        match self {
            Self::Legacy(tx) => tx.gas_price,
            Self::DynamicFee(tx) => tx.max_fee_per_gas,
        }
    }

    pub fn max_priority_fee_per_gas(&self) -> Option<u128> {
        match self {
            Self::Legacy(_) => None,
            Self::DynamicFee(tx) => Some(tx.max_priority_fee_per_gas),
        }
    }

    pub fn to(&self) -> Option<Address> {
        match self {
            Self::Legacy(tx) => tx.to.to().copied(),
            Self::DynamicFee(tx) => tx.to.to().copied(),
        }
    }

    pub fn value(&self) -> U256 {
        match self {
            Self::Legacy(tx) => tx.value,
            Self::DynamicFee(tx) => tx.value,
        }
    }

    pub fn input(&self) -> &Bytes {
        match self {
            Self::Legacy(tx) => &tx.input,
            Self::DynamicFee(tx) => &tx.input,
        }
    }

    pub fn is_dynamic_fee(&self) -> bool {
        matches!(self, Self::DynamicFee(_))
    }
}

/// Build an unsigned transaction from decimal strings (`data` is hex).
///
/// Empty `nonce`, `gas_price`, `value` and `max_priority_fee_per_gas` mean zero; an empty
/// `gas_limit` means [`DEFAULT_GAS_LIMIT`]. An empty `to` targets the zero address.
pub fn build(
    nonce: &str,
    gas_price: &str,
    gas_limit: &str,
    max_priority_fee_per_gas: &str,
    to: &str,
    value: &str,
    data: &str,
) -> BlockchainResult<UnsignedTransaction> {
    let gas_price = parse_fee(gas_price, TxField::GasPrice)?;
    let value = parse_uint(value, TxField::Value)?;
    let priority_fee = parse_fee(max_priority_fee_per_gas, TxField::MaxPriorityFeePerGas)?;
    let nonce = parse_u64(nonce, TxField::Nonce)?.unwrap_or(0);
    let gas_limit = parse_u64(gas_limit, TxField::GasLimit)?.unwrap_or(DEFAULT_GAS_LIMIT);

    let to = if to.is_empty() {
        Address::ZERO
    } else {
        parse_address(to)?
    };

    let input = if data.is_empty() {
        Bytes::new()
    } else {
        decode_hex(data)
            .map(Bytes::from)
            .map_err(|_| BlockchainError::InvalidData(data.to_string()))?
    };

    let tx = if priority_fee == 0 {
        UnsignedTransaction::Legacy(TxLegacy {
            chain_id: None,
            nonce,
            gas_price,
            gas_limit,
            to: TxKind::Call(to),
            value,
            input,
        })
    } else {
        UnsignedTransaction::DynamicFee(TxEip1559 {
            nonce,
            gas_limit,
            max_fee_per_gas: gas_price,
            max_priority_fee_per_gas: priority_fee,
            to: TxKind::Call(to),
            value,
            input,
            ..Default::default()
        })
    };

    Ok(tx)
}

/// Parse an arbitrary-precision decimal; empty is zero.
pub(crate) fn parse_uint(s: &str, field: TxField) -> BlockchainResult<U256> {
    if s.is_empty() {
        return Ok(U256::ZERO);
    }
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(BlockchainError::InvalidField(field));
    }
    U256::from_str_radix(s, 10).map_err(|_| BlockchainError::InvalidField(field))
}

/// Parse a per-gas fee. Values wider than 128 bits are rejected as invalid for the field.
pub(crate) fn parse_fee(s: &str, field: TxField) -> BlockchainResult<u128> {
    let wide = parse_uint(s, field)?;
    u128::try_from(wide).map_err(|_| BlockchainError::InvalidField(field))
}

fn parse_u64(s: &str, field: TxField) -> BlockchainResult<Option<u64>> {
    if s.is_empty() {
        return Ok(None);
    }
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(BlockchainError::InvalidField(field));
    }
    s.parse()
        .map(Some)
        .map_err(|_| BlockchainError::InvalidField(field))
}
