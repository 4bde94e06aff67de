//! Chain-bound transaction signing.

use alloy::consensus::{SignableTransaction, TxEnvelope};
use alloy::eips::eip2718::Encodable2718;
use alloy::primitives::{Bytes, Signature, TxHash};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;

use crate::blockchain::transaction::UnsignedTransaction;
use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainId};

/// A signed transaction and the hash of its EIP-2718 encoding.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    envelope: TxEnvelope,
    signature: Signature,
    hash: TxHash,
}

impl SignedTransaction {
    pub fn hash(&self) -> TxHash {
        self.hash
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn envelope(&self) -> &TxEnvelope {
        &self.envelope
    }

    /// Raw bytes for `eth_sendRawTransaction`.
    pub fn encoded(&self) -> Bytes {
        self.envelope.encoded_2718().into()
    }
}

/// Sign `tx` for `chain_id`.
///
/// Legacy transactions are signed with EIP-155 replay protection; dynamic fee transactions
/// carry the chain id in their payload. Signatures are RFC 6979 deterministic.
pub fn sign(
    signer: Option<&PrivateKeySigner>,
    tx: Option<UnsignedTransaction>,
    chain_id: ChainId,
) -> BlockchainResult<SignedTransaction> {
    let signer = signer.ok_or(BlockchainError::MissingInput("private key"))?;
    let tx = tx.ok_or(BlockchainError::MissingInput("transaction"))?;

    let (envelope, signature, hash) = match tx {
        UnsignedTransaction::Legacy(mut inner) => {
            inner.set_chain_id(chain_id.0);
            let signature = sign_hash(signer, &inner)?;
            let signed = inner.into_signed(signature);
            let hash = *signed.hash();
            (TxEnvelope::from(signed), signature, hash)
        }
        UnsignedTransaction::DynamicFee(mut inner) => {
            inner.set_chain_id(chain_id.0);
            let signature = sign_hash(signer, &inner)?;
            let signed = inner.into_signed(signature);
            let hash = *signed.hash();
            (TxEnvelope::from(signed), signature, hash)
        }
    };

    tracing::debug!(
        tx_hash = %hash,
        chain_id = chain_id.0,
        "Transaction signed"
    );

    Ok(SignedTransaction {
        envelope,
        signature,
        hash,
    })
}

fn sign_hash<T: SignableTransaction<Signature>>(
    signer: &PrivateKeySigner,
    tx: &T,
) -> BlockchainResult<Signature> {
    signer
        .sign_hash_sync(&tx.signature_hash())
        .map_err(|e| BlockchainError::Signing(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::account::signer_from_hex;
    use crate::blockchain::transaction::build;
    use alloy::consensus::Transaction;

    const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TO: &str = "0x0b39fb6bce3381115db85210666585ebb9d32e25";

    fn legacy() -> UnsignedTransaction {
        build("5", "30000000000", "21000", "", TO, "10000", "").unwrap()
    }

    #[test]
    fn test_signing_is_deterministic() {
        let signer = signer_from_hex(TEST_PRIVATE_KEY).unwrap();

        let a = sign(Some(&signer), Some(legacy()), ChainId(1)).unwrap();
        let b = sign(Some(&signer), Some(legacy()), ChainId(1)).unwrap();

        assert_eq!(a.signature(), b.signature());
        assert_eq!(a.hash(), b.hash());
        assert_eq!(a.encoded(), b.encoded());
    }

    #[test]
    fn test_chain_id_separates_signatures() {
        let signer = signer_from_hex(TEST_PRIVATE_KEY).unwrap();

        let mainnet = sign(Some(&signer), Some(legacy()), ChainId(1)).unwrap();
        let sepolia = sign(Some(&signer), Some(legacy()), ChainId(11155111)).unwrap();

        assert_ne!(mainnet.signature(), sepolia.signature());
        assert_ne!(mainnet.hash(), sepolia.hash());
        assert_eq!(mainnet.envelope().chain_id(), Some(1));
        assert_eq!(sepolia.envelope().chain_id(), Some(11155111));
    }

    #[test]
    fn test_signature_recovers_sender() {
        let signer = signer_from_hex(TEST_PRIVATE_KEY).unwrap();
        let tx = build("", "30000000000", "21000", "1000000000", TO, "0", "0x6869").unwrap();

        let mut expected = match &tx {
            UnsignedTransaction::DynamicFee(inner) => inner.clone(),
            other => panic!("expected dynamic fee tx, got {:?}", other),
        };
        expected.chain_id = 31337;

        let signed = sign(Some(&signer), Some(tx), ChainId(31337)).unwrap();

        assert!(matches!(signed.envelope(), TxEnvelope::Eip1559(_)));
        let recovered = signed
            .signature()
            .recover_address_from_prehash(&expected.signature_hash())
            .unwrap();
        assert_eq!(recovered, signer.address());
    }

    #[test]
    fn test_hash_is_keccak_of_encoding() {
        let signer = signer_from_hex(TEST_PRIVATE_KEY).unwrap();
        let signed = sign(Some(&signer), Some(legacy()), ChainId(1)).unwrap();

        assert_eq!(signed.hash(), alloy::primitives::keccak256(signed.encoded()));
    }

    #[test]
    fn test_fee_survives_signing() {
        let signer = signer_from_hex(TEST_PRIVATE_KEY).unwrap();
        let signed = sign(Some(&signer), Some(legacy()), ChainId(1)).unwrap();

        assert_eq!(signed.envelope().gas_price(), Some(30_000_000_000));
        assert_eq!(signed.envelope().nonce(), 5);
        assert_eq!(signed.envelope().gas_limit(), 21000);
    }

    #[test]
    fn test_missing_input() {
        let signer = signer_from_hex(TEST_PRIVATE_KEY).unwrap();

        let err = sign(None, Some(legacy()), ChainId(1)).unwrap_err();
        assert!(matches!(err, BlockchainError::MissingInput("private key")));

        let err = sign(Some(&signer), None, ChainId(1)).unwrap_err();
        assert!(matches!(err, BlockchainError::MissingInput("transaction")));
    }
}
