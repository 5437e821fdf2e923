//! Faucet signing key: address derivation and legacy transaction signing.

use super::rlp;
use super::Address;
use alloy_primitives::{keccak256, U256};
use crate::types::{Error, Result};
use k256::ecdsa::SigningKey;

/// Legacy (pre-EIP-1559) transaction with EIP-155 replay protection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyTransaction {
    pub nonce: u64,
    pub gas_price: U256,
    pub gas_limit: U256,
    pub to: Address,
    pub value: U256,
    pub data: Vec<u8>,
    pub chain_id: u64,
}

impl LegacyTransaction {
    fn fields(&self) -> Vec<Vec<u8>> {
        vec![
            rlp::encode_u64(self.nonce),
            rlp::encode_u256(&self.gas_price),
            rlp::encode_u256(&self.gas_limit),
            rlp::encode_bytes(self.to.as_slice()),
            rlp::encode_u256(&self.value),
            rlp::encode_bytes(&self.data),
        ]
    }

    /// RLP payload whose hash is signed.
    pub fn signing_payload(&self) -> Vec<u8> {
        let mut fields = self.fields();
        fields.push(rlp::encode_u64(self.chain_id));
        fields.push(rlp::encode_u64(0));
        fields.push(rlp::encode_u64(0));
        rlp::encode_list(&fields)
    }

    pub fn signing_hash(&self) -> [u8; 32] {
        keccak256(self.signing_payload()).0
    }
}

/// Secp256k1 key the faucet signs with.
pub struct Signer {
    key: SigningKey,
    address: Address,
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("address", &format_args!("{}", self.address))
            .finish_non_exhaustive()
    }
}

impl Signer {
    /// Load a 32-byte hex key (`0x` prefix optional).
    pub fn from_hex(text: &str) -> Result<Self> {
        let digits = text.strip_prefix("0x").unwrap_or(text);
        let bytes = hex::decode(digits)
            .map_err(|_| Error::validation("signing key is not valid hex"))?;
        let key = SigningKey::from_slice(&bytes)
            .map_err(|_| Error::validation("signing key is not a valid secp256k1 scalar"))?;
        let address = derive_address(&key);
        Ok(Self { key, address })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign and RLP-encode a transaction ready for `eth_sendRawTransaction`.
    pub fn sign_transaction(&self, tx: &LegacyTransaction) -> Result<Vec<u8>> {
        let hash = tx.signing_hash();
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(&hash)
            .map_err(|e| Error::chain(format!("signing failed: {}", e)))?;

        let v = tx
            .chain_id
            .checked_mul(2)
            .and_then(|n| n.checked_add(35 + u64::from(recovery_id.to_byte())))
            .ok_or_else(|| Error::chain("chain id too large for EIP-155"))?;
        let signature_bytes = signature.to_bytes();
        let (r, s) = signature_bytes.split_at(32);

        let mut fields = tx.fields();
        fields.push(rlp::encode_u64(v));
        fields.push(rlp::encode_u256(&scalar(r)?));
        fields.push(rlp::encode_u256(&scalar(s)?));
        Ok(rlp::encode_list(&fields))
    }
}

fn scalar(bytes: &[u8]) -> Result<U256> {
    U256::try_from_be_slice(bytes).ok_or_else(|| Error::chain("signature scalar exceeds 256 bits"))
}

fn derive_address(key: &SigningKey) -> Address {
    let point = key.verifying_key().to_encoded_point(false);
    // Uncompressed SEC1 is 0x04 || X || Y; the address hashes X || Y.
    let hash = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};

    const KEY_ONE: &str = "0x0000000000000000000000000000000000000000000000000000000000000001";

    fn eip155_example() -> LegacyTransaction {
        LegacyTransaction {
            nonce: 9,
            gas_price: U256::from(20_000_000_000u64),
            gas_limit: U256::from(21_000u64),
            to: crate::chain::parse_address("0x3535353535353535353535353535353535353535").unwrap(),
            value: U256::from(1_000_000_000_000_000_000u64),
            data: Vec::new(),
            chain_id: 1,
        }
    }

    #[test]
    fn test_address_derivation() {
        let signer = Signer::from_hex(KEY_ONE).unwrap();
        assert_eq!(
            signer.address().to_string(),
            "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"
        );
    }

    #[test]
    fn test_rejects_invalid_keys() {
        assert!(Signer::from_hex(&"0".repeat(64)).is_err());
        assert!(Signer::from_hex("0xnothex").is_err());
    }

    #[test]
    fn test_eip155_signing_payload() {
        let tx = eip155_example();
        assert_eq!(
            hex::encode(tx.signing_payload()),
            "ec098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a764000080018080"
        );
        assert_eq!(
            hex::encode(tx.signing_hash()),
            "daf5a779ae972f972197303d7b574746c7ef83eadac0f2791ad23db92e4c8e53"
        );
    }

    /// Read one RLP string item at `offset`, returning (content, next offset).
    fn read_item(raw: &[u8], offset: usize) -> (Vec<u8>, usize) {
        let prefix = raw[offset];
        if prefix < 0x80 {
            return (vec![prefix], offset + 1);
        }
        let len = usize::from(prefix - 0x80);
        (raw[offset + 1..offset + 1 + len].to_vec(), offset + 1 + len)
    }

    #[test]
    fn test_signature_recovers_signer() {
        let signer = Signer::from_hex(&"46".repeat(32)).unwrap();
        let tx = eip155_example();
        let raw = signer.sign_transaction(&tx).unwrap();

        // Long-list header (0xf8, len), then the six unsigned fields.
        assert_eq!(raw[0], 0xf8);
        let v_offset = 2 + tx.fields().iter().map(Vec::len).sum::<usize>();
        let (v, r_offset) = read_item(&raw, v_offset);
        let (r, s_offset) = read_item(&raw, r_offset);
        let (s, end) = read_item(&raw, s_offset);
        assert_eq!(end, raw.len());
        assert!(v[0] == 37 || v[0] == 38);

        let mut sig = [0u8; 64];
        sig[32 - r.len()..32].copy_from_slice(&r);
        sig[64 - s.len()..].copy_from_slice(&s);
        let signature = Signature::from_slice(&sig).unwrap();
        let recovery = RecoveryId::from_byte(v[0] - 37).unwrap();
        let recovered =
            VerifyingKey::recover_from_prehash(&tx.signing_hash(), &signature, recovery).unwrap();
        assert_eq!(&recovered, signer.key.verifying_key());
    }

    #[test]
    fn test_debug_hides_key() {
        let signer = Signer::from_hex(KEY_ONE).unwrap();
        let rendered = format!("{:?}", signer);
        assert!(rendered.contains("0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"));
        assert!(!rendered.contains("000000000000000000000001"));
    }
}
