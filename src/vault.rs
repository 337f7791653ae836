//! Decoy Vault - Main Vault Implementation
//!
//! Wires key derivation, the codec, the envelope slot and the capture state
//! machine into the user-facing operations. Every operation ends in a
//! [`Status`]; errors are converted at this boundary and only their kind is
//! logged.
//!
//! There is no attempt counter and no lockout. Unlock attempts can be retried
//! indefinitely, and the rounded tap space is small enough to brute-force
//! offline against a captured envelope.

use std::fmt;
use std::path::Path;

use zeroize::Zeroizing;

use crate::codec::VaultCodec;
use crate::crypto::KeyDeriver;
use crate::envelope::VaultEnvelope;
use crate::error::{VaultError, VaultResult};
use crate::image::{ImageSource, LoadedImage};
use crate::session::{CapturePurpose, CaptureState, TapOutcome};
use crate::store::EnvelopeSlot;
use crate::tap::{TapPoint, TapSequence, TAP_COUNT};

/// User-facing outcome of an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// No envelope stored
    Ready,
    /// An envelope was found at startup
    LockedItemFound,
    RealLoaded,
    DecoySet,
    SetupStarted,
    SetupProgress(usize),
    SecretRecorded,
    Locked,
    UnlockStarted,
    UnlockProgress(usize),
    Unlocked,
    WrongTaps,
    CaptureCancelled,
    Cleared,
    /// Tap arrived with no capture session running
    Idle,
    /// Operation aborted; fixed message without detail
    Failed(&'static str),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ready => f.write_str("Load a real and a decoy image to begin."),
            Status::LockedItemFound => f.write_str("Locked item found. Use Try Unlock."),
            Status::RealLoaded => f.write_str("Real image loaded."),
            Status::DecoySet => f.write_str("Decoy set."),
            Status::SetupStarted => {
                write!(f, "Setup: Tap the image in {} places (order matters).", TAP_COUNT)
            }
            Status::SetupProgress(n) => write!(f, "Tapped {}/{}", n, TAP_COUNT),
            Status::SecretRecorded => {
                write!(f, "{} points recorded. Click \"Lock / Save\".", TAP_COUNT)
            }
            Status::Locked => f.write_str("Locked and saved locally."),
            Status::UnlockStarted => {
                write!(f, "Try mode: Tap {} places to unlock.", TAP_COUNT)
            }
            Status::UnlockProgress(n) => write!(f, "Try taps {}/{}", n, TAP_COUNT),
            Status::Unlocked => f.write_str("Unlocked!"),
            Status::WrongTaps => f.write_str("Wrong taps."),
            Status::CaptureCancelled => f.write_str("Taps discarded."),
            Status::Cleared => f.write_str("Cleared local data."),
            Status::Idle => f.write_str(""),
            Status::Failed(msg) => f.write_str(msg),
        }
    }
}

/// Decoy Vault - Main entry point
pub struct DecoyVault {
    /// Envelope persistence
    slot: EnvelopeSlot,
    /// Tap sequence to key
    deriver: KeyDeriver,
    /// AEAD over the real image
    codec: VaultCodec,
    /// Real image awaiting lock
    real: Option<LoadedImage>,
    /// Decoy image awaiting lock
    decoy: Option<LoadedImage>,
    /// Secret recorded by setup, consumed by lock
    secret: Option<TapSequence>,
    /// Capture state machine
    capture: CaptureState,
    /// What is currently shown (data URL), wiped when replaced
    display: Option<Zeroizing<String>>,
    /// Whether `display` holds the decrypted real image
    revealed: bool,
}

impl DecoyVault {
    // ═══════════════════════════════════════════════════════════════════════
    // INITIALIZATION
    // ═══════════════════════════════════════════════════════════════════════

    /// Open the vault over `slot` with the default SHA-256 / AES-256-GCM stack
    pub fn open(slot: EnvelopeSlot) -> (Self, Status) {
        Self::with_crypto(slot, KeyDeriver::default(), VaultCodec::default())
    }

    /// Open with explicit crypto primitives
    pub fn with_crypto(
        slot: EnvelopeSlot,
        deriver: KeyDeriver,
        codec: VaultCodec,
    ) -> (Self, Status) {
        let mut vault = Self {
            slot,
            deriver,
            codec,
            real: None,
            decoy: None,
            secret: None,
            capture: CaptureState::Idle,
            display: None,
            revealed: false,
        };
        let status = vault.init();
        (vault, status)
    }

    /// Show the stored decoy, if any
    fn init(&mut self) -> Status {
        match self.slot.load() {
            Ok(Some(envelope)) => {
                log::info!("stored envelope found in slot '{}'", self.slot.key());
                self.show_decoy(Zeroizing::new(envelope.decoy_image));
                Status::LockedItemFound
            }
            Ok(None) => Status::Ready,
            Err(e) => Self::fail("open", e),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // IMAGES
    // ═══════════════════════════════════════════════════════════════════════

    pub fn load_real(&mut self, image: LoadedImage) -> Status {
        log::debug!("real image loaded ({})", image.mime());
        self.real = Some(image);
        Status::RealLoaded
    }

    pub fn load_decoy(&mut self, image: LoadedImage) -> Status {
        log::debug!("decoy image loaded ({})", image.mime());
        self.show_decoy(image.to_data_url());
        self.decoy = Some(image);
        Status::DecoySet
    }

    /// Load the real image through an image source
    pub fn load_real_from(&mut self, source: &dyn ImageSource, path: &Path) -> Status {
        match source.load(path) {
            Ok(image) => self.load_real(image),
            Err(e) => Self::fail("load real image", e),
        }
    }

    /// Load the decoy image through an image source
    pub fn load_decoy_from(&mut self, source: &dyn ImageSource, path: &Path) -> Status {
        match source.load(path) {
            Ok(image) => self.load_decoy(image),
            Err(e) => Self::fail("load decoy image", e),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // CAPTURE
    // ═══════════════════════════════════════════════════════════════════════

    /// Start recording a new secret
    pub fn begin_setup(&mut self) -> Status {
        if self.real.is_none() || self.decoy.is_none() {
            return Self::fail("setup", VaultError::MissingImages);
        }

        self.secret = None;
        self.capture = CaptureState::begin(CapturePurpose::Setup);
        Status::SetupStarted
    }

    /// Start an unlock attempt
    pub fn begin_unlock(&mut self) -> Status {
        match self.slot.is_occupied() {
            Ok(true) => {
                self.capture = CaptureState::begin(CapturePurpose::Recall);
                Status::UnlockStarted
            }
            Ok(false) => Self::fail("unlock", VaultError::NothingLocked),
            Err(e) => Self::fail("unlock", e),
        }
    }

    /// Abandon the running session; collected taps leave no trace
    pub fn cancel_capture(&mut self) -> Status {
        self.capture = CaptureState::Idle;
        Status::CaptureCancelled
    }

    /// Feed one tap from the capture surface
    pub fn tap(&mut self, point: TapPoint) -> Status {
        if self.capture.is_idle() {
            return Status::Idle;
        }
        if self.display.is_none() {
            return Self::fail("tap", VaultError::NoImageDisplayed);
        }

        let (next, outcome) = std::mem::take(&mut self.capture).tap(point);
        self.capture = next;

        match outcome {
            TapOutcome::Ignored => Status::Idle,
            TapOutcome::Progress {
                purpose: CapturePurpose::Setup,
                count,
            } => Status::SetupProgress(count),
            TapOutcome::Progress {
                purpose: CapturePurpose::Recall,
                count,
            } => Status::UnlockProgress(count),
            TapOutcome::Finalized {
                purpose: CapturePurpose::Setup,
                sequence,
            } => {
                log::debug!("secret recorded");
                self.secret = Some(sequence);
                Status::SecretRecorded
            }
            TapOutcome::Finalized {
                purpose: CapturePurpose::Recall,
                sequence,
            } => self.attempt_unlock(&sequence),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // LOCK / UNLOCK
    // ═══════════════════════════════════════════════════════════════════════

    /// Encrypt the real image under the recorded secret and store the envelope
    pub fn lock(&mut self) -> Status {
        match self.try_lock() {
            Ok(()) => Status::Locked,
            Err(e) => Self::fail("lock", e),
        }
    }

    fn try_lock(&mut self) -> VaultResult<()> {
        let (real, decoy) = match (&self.real, &self.decoy) {
            (Some(real), Some(decoy)) => (real, decoy),
            _ => return Err(VaultError::MissingImages),
        };
        let secret = self.secret.take().ok_or(VaultError::NoSecretRecorded)?;

        let key = self.deriver.derive(&secret)?;
        let locked = self.codec.lock(&key, real.bytes())?;

        let decoy_url = decoy.to_data_url();
        let envelope = VaultEnvelope::new(
            decoy_url.as_str().to_owned(),
            locked.iv.to_vec(),
            locked.ciphertext,
        );
        self.slot.save(&envelope)?;

        log::info!(
            "envelope saved to slot '{}' ({} bytes ciphertext)",
            self.slot.key(),
            envelope.ciphertext.len()
        );
        self.show_decoy(decoy_url);
        Ok(())
    }

    /// Try a finalized sequence against the stored envelope
    ///
    /// Shows the real image on success and the decoy otherwise. With no
    /// readable envelope there is no decoy to show, so the display is blanked;
    /// no key is derived and nothing is decrypted.
    pub fn attempt_unlock(&mut self, sequence: &TapSequence) -> Status {
        let envelope = match self.slot.load() {
            Ok(Some(envelope)) => envelope,
            Ok(None) => {
                self.blank_display();
                return Status::WrongTaps;
            }
            Err(e) => {
                self.blank_display();
                Self::fail("unlock", e);
                return Status::WrongTaps;
            }
        };

        self.show_decoy(Zeroizing::new(envelope.decoy_image.clone()));

        match self.try_open(sequence, &envelope) {
            Ok(image) => {
                log::info!("unlock accepted");
                self.display = Some(image.to_data_url());
                self.revealed = true;
                Status::Unlocked
            }
            Err(e) => {
                log::info!("unlock rejected ({:?})", e.kind());
                Status::WrongTaps
            }
        }
    }

    fn try_open(
        &self,
        sequence: &TapSequence,
        envelope: &VaultEnvelope,
    ) -> VaultResult<LoadedImage> {
        let key = self.deriver.derive(sequence)?;
        let mut plain = self.codec.unlock(&key, envelope)?;
        Ok(LoadedImage::from_bytes(std::mem::take(&mut *plain)))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // CLEAR
    // ═══════════════════════════════════════════════════════════════════════

    /// Delete the stored envelope and forget everything in memory
    pub fn clear(&mut self) -> Status {
        self.real = None;
        self.decoy = None;
        self.secret = None;
        self.capture = CaptureState::Idle;
        self.blank_display();

        match self.slot.clear() {
            Ok(()) => {
                log::info!("slot '{}' cleared", self.slot.key());
                Status::Cleared
            }
            Err(e) => Self::fail("clear", e),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════

    /// Currently displayed image as a data URL
    pub fn displayed(&self) -> Option<&str> {
        self.display.as_ref().map(|url| url.as_str())
    }

    /// True while the decrypted real image is displayed
    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn capture(&self) -> &CaptureState {
        &self.capture
    }

    pub fn has_secret(&self) -> bool {
        self.secret.is_some()
    }

    /// Whether an envelope is stored
    pub fn is_locked(&self) -> VaultResult<bool> {
        self.slot.is_occupied()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // HELPERS
    // ═══════════════════════════════════════════════════════════════════════

    /// Replacing `display` drops, and so wipes, whatever was shown before
    fn show_decoy(&mut self, decoy_url: Zeroizing<String>) {
        self.display = Some(decoy_url);
        self.revealed = false;
    }

    fn blank_display(&mut self) {
        self.display = None;
        self.revealed = false;
    }

    fn fail(operation: &str, err: VaultError) -> Status {
        if err.is_recoverable() {
            log::debug!("{} needs input ({:?})", operation, err.kind());
        } else {
            log::warn!("{} failed ({:?})", operation, err.kind());
        }
        Status::Failed(err.user_message())
    }
}
