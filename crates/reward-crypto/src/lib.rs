//! The two ECDSA-secp256k1 wire shapes the reward bridge signs with:
//! OpenZeppelin's "Ethereum Signed Message" convention (`v ∈ {27,28}`) and
//! Gnosis Safe's raw-digest convention (`v ∈ {31,32}`). These are kept as
//! entirely separate functions — never collapsed into one helper — because
//! the Safe `+4` marker means something specific to the Safe contract
//! ("pre-validated off-chain signer") that the OZ path doesn't have.

mod error;

pub use error::CryptoError;

use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use reward_abi::keccak256;
use sha3::{Digest, Keccak256};

/// A private key wrapper that never derives `Debug` with key material
/// exposed — only the derived address is ever printed.
pub struct Signer {
    key: SigningKey,
}

impl Signer {
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, CryptoError> {
        let key = SigningKey::from_slice(bytes).map_err(|_| CryptoError::InvalidKey)?;
        Ok(Self { key })
    }

    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let stripped = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
        let bytes = hex::decode(stripped).map_err(|_| CryptoError::InvalidKey)?;
        if bytes.len() != 32 {
            return Err(CryptoError::InvalidKey);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Self::from_bytes(&arr)
    }

    /// The 20-byte Ethereum address for this key.
    pub fn address(&self) -> [u8; 20] {
        address_from_verifying_key(self.key.verifying_key())
    }

    /// `ZeppelinSign`: signs the EIP-191 "Ethereum Signed Message" digest
    /// of `msg`. `v ∈ {27,28}`.
    pub fn zeppelin_sign(&self, msg: &[u8]) -> [u8; 65] {
        let digest = eth_signed_message_hash(msg);
        self.gnosis_sign_digest_raw(&digest, 27)
    }

    /// `GnosisSignDigest`: signs the already-computed 32-byte digest
    /// directly, with the Safe's `v ∈ {31,32}` pre-validated marker.
    pub fn gnosis_sign_digest(&self, digest: &[u8; 32]) -> [u8; 65] {
        self.gnosis_sign_digest_raw(digest, 31)
    }

    fn gnosis_sign_digest_raw(&self, digest: &[u8; 32], v_base: u8) -> [u8; 65] {
        let (sig, recid): (Signature, RecoveryId) = self
            .key
            .sign_prehash_recoverable(digest)
            .expect("signing a 32-byte prehash cannot fail");
        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&sig.to_bytes());
        out[64] = recid.to_byte() + v_base;
        out
    }
}

/// `keccak256("\x19Ethereum Signed Message:\n" || len(msg) || msg)`.
pub fn eth_signed_message_hash(msg: &[u8]) -> [u8; 32] {
    let prefix = format!("\x19Ethereum Signed Message:\n{}", msg.len());
    let mut hasher = Keccak256::new();
    hasher.update(prefix.as_bytes());
    hasher.update(msg);
    let out = hasher.finalize();
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&out);
    digest
}

fn address_from_verifying_key(vk: &VerifyingKey) -> [u8; 20] {
    let encoded = vk.to_encoded_point(false);
    let uncompressed = encoded.as_bytes();
    // Drop the leading 0x04 tag byte before hashing, per the standard
    // Ethereum address derivation.
    let hash = keccak256(&uncompressed[1..]);
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&hash[12..]);
    addr
}

/// `GnosisVerifyDigest`: recovers the signer from `sig` over `digest` and
/// checks it matches `addr`. Never mutates the caller's `sig`.
pub fn gnosis_verify_digest(sig: &[u8], digest: &[u8; 32], addr: &[u8; 20]) -> Result<(), CryptoError> {
    if sig.len() != 65 {
        return Err(CryptoError::WrongLength(sig.len()));
    }
    let v = sig[64];
    if !(31..=32).contains(&v) {
        return Err(CryptoError::BadRecoveryByte(v));
    }
    // Work on a local copy; the caller's slice is untouched.
    let raw_v = v - 31;
    let recid = RecoveryId::from_byte(raw_v).ok_or(CryptoError::RecoveryFailed)?;
    let signature = Signature::from_slice(&sig[..64]).map_err(|_| CryptoError::RecoveryFailed)?;

    let recovered = VerifyingKey::recover_from_prehash(digest, &signature, recid)
        .map_err(|_| CryptoError::RecoveryFailed)?;
    let recovered_addr = address_from_verifying_key(&recovered);

    if &recovered_addr == addr {
        Ok(())
    } else {
        Err(CryptoError::AddressMismatch)
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer").field("address", &hex::encode(self.address())).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> Signer {
        // Well-known Hardhat/Anvil test account #0 private key.
        Signer::from_hex("0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80").unwrap()
    }

    #[test]
    fn gnosis_sign_then_verify_round_trips() {
        let signer = test_key();
        let digest = keccak256(b"epoch-42-root");
        let sig = signer.gnosis_sign_digest(&digest);
        assert!((31..=32).contains(&sig[64]));
        let addr = signer.address();
        gnosis_verify_digest(&sig, &digest, &addr).unwrap();
    }

    #[test]
    fn gnosis_verify_rejects_wrong_address() {
        let signer = test_key();
        let digest = keccak256(b"epoch-42-root");
        let sig = signer.gnosis_sign_digest(&digest);
        let wrong_addr = [0u8; 20];
        assert!(gnosis_verify_digest(&sig, &digest, &wrong_addr).is_err());
    }

    #[test]
    fn gnosis_verify_rejects_bad_v_byte() {
        let signer = test_key();
        let digest = keccak256(b"epoch-42-root");
        let mut sig = signer.gnosis_sign_digest(&digest);
        sig[64] = 27; // valid for zeppelin, invalid for gnosis
        let addr = signer.address();
        assert!(matches!(gnosis_verify_digest(&sig, &digest, &addr), Err(CryptoError::BadRecoveryByte(27))));
    }

    #[test]
    fn gnosis_verify_rejects_wrong_length() {
        let addr = [0u8; 20];
        let digest = [0u8; 32];
        assert!(matches!(gnosis_verify_digest(&[0u8; 64], &digest, &addr), Err(CryptoError::WrongLength(64))));
    }

    #[test]
    fn zeppelin_sign_uses_27_28_v_range() {
        let signer = test_key();
        let sig = signer.zeppelin_sign(b"hello world");
        assert!((27..=28).contains(&sig[64]));
    }

    #[test]
    fn signing_does_not_mutate_input_digest() {
        let signer = test_key();
        let digest = keccak256(b"immutable");
        let before = digest;
        let _ = signer.gnosis_sign_digest(&digest);
        assert_eq!(digest, before);
    }
}
