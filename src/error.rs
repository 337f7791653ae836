//! Decoy Vault - Error Types

use thiserror::Error;

/// Result type for vault operations
pub type VaultResult<T> = Result<T, VaultError>;

/// Vault error types
#[derive(Error, Debug)]
pub enum VaultError {
    // ═══════════════════════════════════════════════════════════════
    // INPUT ERRORS
    // ═══════════════════════════════════════════════════════════════

    #[error("Both a real and a decoy image are required")]
    MissingImages,

    #[error("No secret tap sequence recorded")]
    NoSecretRecorded,

    #[error("Nothing locked yet")]
    NothingLocked,

    #[error("No image displayed")]
    NoImageDisplayed,

    #[error("Invalid tap count: expected {expected}, got {actual}")]
    InvalidTapCount { expected: usize, actual: usize },

    #[error("Tap coordinate out of range: ({x}, {y})")]
    InvalidTapPoint { x: f64, y: f64 },

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("File too large: {size} bytes (max: {max})")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Invalid storage key: {0}")]
    InvalidStorageKey(String),

    // ═══════════════════════════════════════════════════════════════
    // CRYPTO ERRORS
    // ═══════════════════════════════════════════════════════════════

    #[error("Crypto provider failure: {0}")]
    CryptoProvider(String),

    /// Wrong key and tampered data are deliberately the same variant
    #[error("Unlock failed")]
    UnlockFailed,

    // ═══════════════════════════════════════════════════════════════
    // COLLABORATOR ERRORS
    // ═══════════════════════════════════════════════════════════════

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Coarse error classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed user input, recovered by prompting
    Input,
    /// Hash, cipher or randomness unavailable
    CryptoProvider,
    /// Authenticated decryption rejected the attempt
    Unlock,
    /// Storage, file or config plumbing
    Collaborator,
}

impl VaultError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            VaultError::MissingImages
            | VaultError::NoSecretRecorded
            | VaultError::NothingLocked
            | VaultError::NoImageDisplayed
            | VaultError::InvalidTapCount { .. }
            | VaultError::InvalidTapPoint { .. }
            | VaultError::InvalidImage(_)
            | VaultError::FileTooLarge { .. }
            | VaultError::InvalidStorageKey(_) => ErrorKind::Input,
            VaultError::CryptoProvider(_) => ErrorKind::CryptoProvider,
            VaultError::UnlockFailed => ErrorKind::Unlock,
            VaultError::IoError(_)
            | VaultError::SerializationError(_)
            | VaultError::ConfigError(_) => ErrorKind::Collaborator,
        }
    }

    /// Fixed user-facing message; never carries the inner detail
    pub fn user_message(&self) -> &'static str {
        match self {
            VaultError::MissingImages => "Upload both real and decoy first.",
            VaultError::NoSecretRecorded => "No secret recorded. Press \"Setup secret\" first.",
            VaultError::NothingLocked => "Nothing locked yet.",
            VaultError::NoImageDisplayed => "No image displayed. Set decoy first.",
            VaultError::InvalidTapCount { .. } | VaultError::InvalidTapPoint { .. } => {
                "Tap not recognised."
            }
            VaultError::InvalidImage(_) | VaultError::FileTooLarge { .. } => {
                "That file cannot be used as an image."
            }
            VaultError::InvalidStorageKey(_) | VaultError::ConfigError(_) => {
                "Vault configuration is invalid."
            }
            VaultError::CryptoProvider(_) => "Operation failed.",
            VaultError::UnlockFailed => "Wrong taps.",
            VaultError::IoError(_) | VaultError::SerializationError(_) => {
                "Local storage is unavailable."
            }
        }
    }

    /// Check if the user can fix this by completing a prerequisite
    pub fn is_recoverable(&self) -> bool {
        self.kind() == ErrorKind::Input
    }
}

impl From<serde_json::Error> for VaultError {
    fn from(e: serde_json::Error) -> Self {
        VaultError::SerializationError(e.to_string())
    }
}

impl From<base64::DecodeError> for VaultError {
    fn from(e: base64::DecodeError) -> Self {
        VaultError::InvalidImage(e.to_string())
    }
}
