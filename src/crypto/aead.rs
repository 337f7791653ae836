//! Decoy Vault - AEAD Encryption
//!
//! AES-256-GCM with a 96-bit random IV. The ciphertext carries its 16-byte
//! tag; tag and ciphertext are never stored apart.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::{rngs::OsRng, RngCore};
use zeroize::Zeroizing;

use super::keys::DerivedKey;
use crate::error::{VaultError, VaultResult};

/// IV length for AES-GCM
pub const IV_LEN: usize = 12;

/// GCM authentication tag length
pub const TAG_LEN: usize = 16;

/// Authenticated cipher
pub trait AeadCipher: Send + Sync {
    /// Encrypt; output is ciphertext || tag
    fn seal(
        &self,
        key: &DerivedKey,
        iv: &[u8; IV_LEN],
        plaintext: &[u8],
    ) -> VaultResult<Vec<u8>>;

    /// Decrypt and authenticate
    ///
    /// Every rejection is `VaultError::UnlockFailed`.
    fn open(
        &self,
        key: &DerivedKey,
        iv: &[u8; IV_LEN],
        ciphertext: &[u8],
    ) -> VaultResult<Zeroizing<Vec<u8>>>;
}

/// Source of IV randomness
pub trait RandomBytes: Send + Sync {
    fn fill(&self, buf: &mut [u8]) -> VaultResult<()>;
}

// ═══════════════════════════════════════════════════════════════════════════
// AES-256-GCM
// ═══════════════════════════════════════════════════════════════════════════

/// AES-256-GCM cipher
#[derive(Debug, Default, Clone, Copy)]
pub struct AesGcmCipher;

impl AeadCipher for AesGcmCipher {
    fn seal(
        &self,
        key: &DerivedKey,
        iv: &[u8; IV_LEN],
        plaintext: &[u8],
    ) -> VaultResult<Vec<u8>> {
        let cipher = Aes256Gcm::new_from_slice(key.expose())
            .map_err(|e| VaultError::CryptoProvider(e.to_string()))?;

        cipher
            .encrypt(Nonce::from_slice(iv), plaintext)
            .map_err(|e| VaultError::CryptoProvider(e.to_string()))
    }

    fn open(
        &self,
        key: &DerivedKey,
        iv: &[u8; IV_LEN],
        ciphertext: &[u8],
    ) -> VaultResult<Zeroizing<Vec<u8>>> {
        let cipher =
            Aes256Gcm::new_from_slice(key.expose()).map_err(|_| VaultError::UnlockFailed)?;

        cipher
            .decrypt(Nonce::from_slice(iv), ciphertext)
            .map(Zeroizing::new)
            .map_err(|_| VaultError::UnlockFailed)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// OS RANDOMNESS
// ═══════════════════════════════════════════════════════════════════════════

/// Operating system CSPRNG
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandom;

impl RandomBytes for OsRandom {
    fn fill(&self, buf: &mut [u8]) -> VaultResult<()> {
        OsRng
            .try_fill_bytes(buf)
            .map_err(|e| VaultError::CryptoProvider(format!("RNG failed: {}", e)))
    }
}

/// Generate a random IV
pub fn generate_iv(random: &dyn RandomBytes) -> VaultResult<[u8; IV_LEN]> {
    let mut iv = [0u8; IV_LEN];
    random.fill(&mut iv)?;
    Ok(iv)
}
