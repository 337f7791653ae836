//! Decoy Vault - Persisted Envelope
//!
//! The single record kept in storage: the decoy in the clear, the real image
//! as AES-GCM ciphertext.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Stored vault record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultEnvelope {
    /// Renderable decoy reference (data URL)
    #[serde(alias = "decoy")]
    pub decoy_image: String,
    /// AES-GCM IV
    pub iv: Vec<u8>,
    /// Ciphertext with authentication tag
    #[serde(alias = "ct")]
    pub ciphertext: Vec<u8>,
    /// Lock time, epoch milliseconds
    #[serde(alias = "created")]
    pub created_at: i64,
}

impl VaultEnvelope {
    /// Assemble an envelope stamped with the current time
    pub fn new(decoy_image: String, iv: Vec<u8>, ciphertext: Vec<u8>) -> Self {
        Self {
            decoy_image,
            iv,
            ciphertext,
            created_at: Utc::now().timestamp_millis(),
        }
    }
}
