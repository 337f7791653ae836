//! Decoy Vault - Key Derivation
//!
//! Turns a finalized tap sequence into the AES-256 key used for the vault.

use secrecy::{ExposeSecret, Secret};
use sha2::{Digest, Sha256};

use crate::error::VaultResult;
use crate::tap::TapSequence;

/// Key length for AES-256
pub const KEY_LEN: usize = 32;

/// One-way hash producing key material
pub trait Hasher: Send + Sync {
    fn digest(&self, data: &[u8]) -> VaultResult<[u8; KEY_LEN]>;
}

/// SHA-256 hasher
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256Hasher;

impl Hasher for Sha256Hasher {
    fn digest(&self, data: &[u8]) -> VaultResult<[u8; KEY_LEN]> {
        let mut out = [0u8; KEY_LEN];
        out.copy_from_slice(&Sha256::digest(data));
        Ok(out)
    }
}

/// Symmetric key derived from a tap sequence
///
/// Zeroized on drop; `Debug` never prints the bytes.
pub struct DerivedKey {
    inner: Secret<[u8; KEY_LEN]>,
}

impl DerivedKey {
    /// Wrap raw key bytes
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self {
            inner: Secret::new(bytes),
        }
    }

    /// Expose the key bytes (use with caution)
    pub fn expose(&self) -> &[u8; KEY_LEN] {
        self.inner.expose_secret()
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Maps tap sequences to keys
pub struct KeyDeriver {
    hasher: Box<dyn Hasher>,
}

impl Default for KeyDeriver {
    fn default() -> Self {
        Self::new(Box::new(Sha256Hasher))
    }
}

impl KeyDeriver {
    pub fn new(hasher: Box<dyn Hasher>) -> Self {
        Self { hasher }
    }

    /// Derive the vault key for `taps`
    ///
    /// The digest of the canonical text is used directly as key material.
    pub fn derive(&self, taps: &TapSequence) -> VaultResult<DerivedKey> {
        let canonical = taps.canonical();
        let digest = self.hasher.digest(canonical.as_bytes())?;
        Ok(DerivedKey::new(digest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VaultError;
    use crate::tap::TapPoint;

    fn seq(points: [(f64, f64); 4]) -> TapSequence {
        TapSequence::new(points.map(|(x, y)| TapPoint::clamped(x, y)))
    }

    const SQUARE: [(f64, f64); 4] = [(0.1, 0.1), (0.9, 0.1), (0.9, 0.9), (0.1, 0.9)];

    #[test]
    fn test_known_answer() {
        let key = KeyDeriver::default().derive(&seq(SQUARE)).unwrap();
        assert_eq!(
            hex::encode(key.expose()),
            "cfe48d5b252de410fb5db85e3b63bcd3711e21f6b6d4e6c03ffe945f7fe32814"
        );
    }

    #[test]
    fn test_deterministic() {
        let deriver = KeyDeriver::default();
        let k1 = deriver.derive(&seq(SQUARE)).unwrap();
        let k2 = deriver.derive(&seq(SQUARE)).unwrap();
        assert_eq!(k1.expose(), k2.expose());
    }

    #[test]
    fn test_order_sensitive() {
        let deriver = KeyDeriver::default();
        let base = deriver.derive(&seq(SQUARE)).unwrap();

        let permutations = [
            [SQUARE[3], SQUARE[2], SQUARE[1], SQUARE[0]],
            [SQUARE[1], SQUARE[0], SQUARE[2], SQUARE[3]],
            [SQUARE[0], SQUARE[1], SQUARE[3], SQUARE[2]],
            [SQUARE[2], SQUARE[3], SQUARE[0], SQUARE[1]],
        ];
        for p in permutations {
            let k = deriver.derive(&seq(p)).unwrap();
            assert_ne!(base.expose(), k.expose());
        }
    }

    #[test]
    fn test_swapped_axes_differ() {
        let deriver = KeyDeriver::default();
        let a = deriver
            .derive(&seq([(0.2, 0.7), (0.3, 0.3), (0.4, 0.4), (0.5, 0.5)]))
            .unwrap();
        let b = deriver
            .derive(&seq([(0.7, 0.2), (0.3, 0.3), (0.4, 0.4), (0.5, 0.5)]))
            .unwrap();
        assert_ne!(a.expose(), b.expose());
    }

    #[test]
    fn test_rounding_tolerance() {
        let deriver = KeyDeriver::default();
        let base = [(0.12341, 0.5672), (0.3, 0.40001), (0.77772, 0.1), (0.9, 0.65553)];
        let jitter = [
            (0.12343, 0.567204),
            (0.300004, 0.40003),
            (0.77771, 0.100002),
            (0.90001, 0.65551),
        ];
        let k1 = deriver.derive(&seq(base)).unwrap();
        let k2 = deriver.derive(&seq(jitter)).unwrap();
        assert_eq!(k1.expose(), k2.expose());

        let moved = [(0.1235, 0.5672), (0.3, 0.40001), (0.77772, 0.1), (0.9, 0.65553)];
        let k3 = deriver.derive(&seq(moved)).unwrap();
        assert_ne!(k1.expose(), k3.expose());
    }

    #[test]
    fn test_debug_redacts() {
        let key = DerivedKey::new([0xAB; KEY_LEN]);
        let shown = format!("{:?}", key);
        assert!(!shown.contains("171"));
        assert!(shown.contains("REDACTED"));
    }

    struct BrokenHasher;

    impl Hasher for BrokenHasher {
        fn digest(&self, _data: &[u8]) -> VaultResult<[u8; KEY_LEN]> {
            Err(VaultError::CryptoProvider("digest unavailable".into()))
        }
    }

    #[test]
    fn test_hasher_failure_is_provider_error() {
        let deriver = KeyDeriver::new(Box::new(BrokenHasher));
        let err = deriver.derive(&seq(SQUARE)).unwrap_err();
        assert!(matches!(err, VaultError::CryptoProvider(_)));
    }
}
