//! Decoy Vault - Cryptographic Core
//!
//! Tap-sequence key derivation and AES-256-GCM, each behind a trait so a
//! platform can swap the primitive.

pub mod keys;
pub mod aead;

pub use keys::*;
pub use aead::*;
