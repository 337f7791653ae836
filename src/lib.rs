//! # Decoy Vault
//!
//! Gesture-unlocked image vault. A real image is encrypted under a key
//! derived from four taps on the displayed picture; everyone who cannot
//! repeat the taps sees only the decoy.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                       DECOY VAULT                         │
//! │  ┌─────────────┐   ┌─────────────┐   ┌────────────────┐  │
//! │  │ CAPTURE     │──▶│ KEY DERIVER │──▶│ VAULT CODEC    │  │
//! │  │ 4 taps      │   │ SHA-256     │   │ AES-256-GCM    │  │
//! │  └─────────────┘   └─────────────┘   └───────┬────────┘  │
//! │                                              │           │
//! │  ┌─────────────┐   ┌─────────────────────────┴────────┐  │
//! │  │ IMAGE SRC   │   │ ENVELOPE SLOT (single key, JSON) │  │
//! │  └─────────────┘   └──────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Security Model
//!
//! - Tap coordinates quantized to 1/10_000, joined in order, SHA-256 → key
//! - Fresh random 96-bit IV on every lock
//! - Wrong taps and tampered data fail identically
//! - Decoy stored in the clear, real image only as ciphertext
//! - No lockout: the tap space is small and can be brute-forced offline

pub mod codec;
pub mod config;
pub mod crypto;
pub mod envelope;
pub mod error;
pub mod image;
pub mod session;
pub mod store;
pub mod tap;
pub mod vault;

pub use codec::{LockedImage, VaultCodec};
pub use config::VaultConfig;
pub use crypto::{DerivedKey, KeyDeriver};
pub use envelope::VaultEnvelope;
pub use error::{ErrorKind, VaultError, VaultResult};
pub use image::{FileImageSource, ImageSource, LoadedImage};
pub use session::{CapturePurpose, CaptureState, TapOutcome};
pub use store::{EnvelopeSlot, FileStore, KeyValueStore, MemoryStore};
pub use tap::{TapPoint, TapSequence};
pub use vault::{DecoyVault, Status};

/// Decoy Vault version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
