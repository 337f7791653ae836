//! Decoy Vault - Image Source
//!
//! Loads user-selected files as raw bytes and renders them as data URLs.

use std::fs;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use zeroize::Zeroizing;

use crate::error::{VaultError, VaultResult};

/// MIME type used when the content is not recognised
pub const FALLBACK_MIME: &str = "application/octet-stream";

/// Image bytes plus the MIME type they were sniffed as
#[derive(Clone)]
pub struct LoadedImage {
    bytes: Zeroizing<Vec<u8>>,
    mime: String,
}

impl LoadedImage {
    /// Wrap raw bytes, sniffing the MIME type
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let mime = detect_mime(&bytes).to_string();
        Self {
            bytes: Zeroizing::new(bytes),
            mime,
        }
    }

    /// Parse a `data:<mime>;base64,<payload>` URL
    pub fn from_data_url(url: &str) -> VaultResult<Self> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| VaultError::InvalidImage("not a data URL".into()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| VaultError::InvalidImage("missing payload".into()))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| VaultError::InvalidImage("payload is not base64".into()))?;

        let bytes = STANDARD.decode(payload)?;
        let mime = if mime.is_empty() { FALLBACK_MIME } else { mime };

        Ok(Self {
            bytes: Zeroizing::new(bytes),
            mime: mime.to_string(),
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Renderable blob reference
    ///
    /// Encoded straight into a pre-sized buffer that is wiped on drop.
    pub fn to_data_url(&self) -> Zeroizing<String> {
        let prefix = format!("data:{};base64,", self.mime);
        let encoded_len = self.bytes.len().div_ceil(3) * 4;
        let mut url = Zeroizing::new(String::with_capacity(prefix.len() + encoded_len));
        url.push_str(&prefix);
        STANDARD.encode_string(self.bytes.as_slice(), &mut url);
        url
    }
}

impl std::fmt::Debug for LoadedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedImage")
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Produces image bytes from a user-selected file
pub trait ImageSource {
    fn load(&self, path: &Path) -> VaultResult<LoadedImage>;
}

/// Reads images from the local filesystem
#[derive(Debug, Clone)]
pub struct FileImageSource {
    max_bytes: u64,
}

impl FileImageSource {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }
}

impl ImageSource for FileImageSource {
    fn load(&self, path: &Path) -> VaultResult<LoadedImage> {
        let size = fs::metadata(path)?.len();
        if size > self.max_bytes {
            return Err(VaultError::FileTooLarge {
                size,
                max: self.max_bytes,
            });
        }

        let bytes = fs::read(path)?;
        if bytes.is_empty() {
            return Err(VaultError::InvalidImage(format!("{} is empty", path.display())));
        }

        Ok(LoadedImage::from_bytes(bytes))
    }
}

/// Detect MIME type from file content
pub fn detect_mime(data: &[u8]) -> &'static str {
    if data.len() < 8 {
        return FALLBACK_MIME;
    }

    // Check magic bytes
    match &data[0..8] {
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A] => "image/png",
        [0x47, 0x49, 0x46, 0x38, ..] => "image/gif",
        [0x42, 0x4D, ..] => "image/bmp",
        [0x52, 0x49, 0x46, 0x46, ..] => {
            if data.len() >= 12 && &data[8..12] == b"WEBP" {
                "image/webp"
            } else {
                FALLBACK_MIME
            }
        }
        _ => {
            // HEIC/HEIF
            if data.len() >= 12 && &data[4..8] == b"ftyp" {
                match &data[8..12] {
                    b"heic" | b"heix" => return "image/heic",
                    b"mif1" => return "image/heif",
                    _ => {}
                }
            }
            FALLBACK_MIME
        }
    }
}
