//! Decoy Vault - Vault Codec
//!
//! Seals the real image under a tap-derived key and opens stored envelopes.
//! A failed open never says whether the key was wrong or the data altered.

use zeroize::Zeroizing;

use crate::crypto::{
    generate_iv, AeadCipher, AesGcmCipher, DerivedKey, OsRandom, RandomBytes, IV_LEN,
};
use crate::envelope::VaultEnvelope;
use crate::error::{VaultError, VaultResult};

/// Output of a lock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockedImage {
    pub iv: [u8; IV_LEN],
    /// Ciphertext with tag appended
    pub ciphertext: Vec<u8>,
}

/// Encrypts and decrypts vault payloads
pub struct VaultCodec {
    cipher: Box<dyn AeadCipher>,
    random: Box<dyn RandomBytes>,
}

impl Default for VaultCodec {
    fn default() -> Self {
        Self::new(Box::new(AesGcmCipher), Box::new(OsRandom))
    }
}

impl VaultCodec {
    pub fn new(cipher: Box<dyn AeadCipher>, random: Box<dyn RandomBytes>) -> Self {
        Self { cipher, random }
    }

    /// Encrypt `plain` under `key` with a fresh IV
    pub fn lock(&self, key: &DerivedKey, plain: &[u8]) -> VaultResult<LockedImage> {
        let iv = generate_iv(self.random.as_ref())?;
        let ciphertext = self.cipher.seal(key, &iv, plain)?;
        Ok(LockedImage { iv, ciphertext })
    }

    /// Decrypt the envelope's ciphertext with a candidate key
    pub fn unlock(
        &self,
        key: &DerivedKey,
        envelope: &VaultEnvelope,
    ) -> VaultResult<Zeroizing<Vec<u8>>> {
        // A malformed IV is indistinguishable from tampering
        let iv: [u8; IV_LEN] = envelope
            .iv
            .as_slice()
            .try_into()
            .map_err(|_| VaultError::UnlockFailed)?;

        self.cipher
            .open(key, &iv, &envelope.ciphertext)
            .map_err(|_| VaultError::UnlockFailed)
    }
}
