//! Decoy Vault - Tap Points
//!
//! Normalized tap coordinates and the fixed-length sequence that acts as the
//! shared secret.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::{VaultError, VaultResult};

/// Number of taps in a secret
pub const TAP_COUNT: usize = 4;

/// Quantization steps per unit (4 decimal places)
pub const TAP_PRECISION: f64 = 10_000.0;

/// Room for four `1.0000,1.0000` pairs and their separators
const CANONICAL_CAPACITY: usize = 64;

/// A position on the displayed image, normalized to its bounding box
///
/// Both coordinates are always within `[0, 1]`; deserialization goes through
/// [`TapPoint::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTapPoint")]
pub struct TapPoint {
    x: f64,
    y: f64,
}

#[derive(Deserialize)]
struct RawTapPoint {
    x: f64,
    y: f64,
}

impl TryFrom<RawTapPoint> for TapPoint {
    type Error = VaultError;

    fn try_from(raw: RawTapPoint) -> VaultResult<Self> {
        TapPoint::new(raw.x, raw.y)
    }
}

impl TapPoint {
    /// Create a point, rejecting anything outside `[0, 1]`
    pub fn new(x: f64, y: f64) -> VaultResult<Self> {
        let in_range = |v: f64| v.is_finite() && (0.0..=1.0).contains(&v);
        if !in_range(x) || !in_range(y) {
            return Err(VaultError::InvalidTapPoint { x, y });
        }
        Ok(Self { x, y })
    }

    /// Create a point, clamping each coordinate into `[0, 1]`
    ///
    /// NaN collapses to 0.
    pub fn clamped(x: f64, y: f64) -> Self {
        let clamp = |v: f64| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        Self {
            x: clamp(x),
            y: clamp(y),
        }
    }

    /// Normalize a position on a rendered surface of `width` x `height`
    pub fn from_surface(px: f64, py: f64, width: f64, height: f64) -> VaultResult<Self> {
        if !(width > 0.0 && height > 0.0) {
            return Err(VaultError::NoImageDisplayed);
        }
        Ok(Self::clamped(px / width, py / height))
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    /// Coordinates quantized to 1/10_000 steps
    pub fn quantized(&self) -> (u32, u32) {
        (quantize(self.x), quantize(self.y))
    }
}

fn quantize(v: f64) -> u32 {
    // f64::round is half away from zero
    (v * TAP_PRECISION).round() as u32
}

/// Ordered sequence of exactly four taps
#[derive(Debug, Clone, PartialEq)]
pub struct TapSequence {
    points: [TapPoint; TAP_COUNT],
}

impl TapSequence {
    /// Build from exactly four points
    pub fn new(points: [TapPoint; TAP_COUNT]) -> Self {
        Self { points }
    }

    /// Build from a slice, failing unless it holds exactly four points
    pub fn from_slice(points: &[TapPoint]) -> VaultResult<Self> {
        let fixed: [TapPoint; TAP_COUNT] =
            points.try_into().map_err(|_| VaultError::InvalidTapCount {
                expected: TAP_COUNT,
                actual: points.len(),
            })?;
        Ok(Self { points: fixed })
    }

    /// Points in tap order
    pub fn points(&self) -> &[TapPoint; TAP_COUNT] {
        &self.points
    }

    /// Canonical text fed to the key hash
    ///
    /// `x,y` pairs with four fractional digits, joined by `|` in tap order.
    /// Built in place in a pre-sized buffer so no unwiped copy is left behind.
    pub fn canonical(&self) -> Zeroizing<String> {
        let mut text = Zeroizing::new(String::with_capacity(CANONICAL_CAPACITY));
        for (i, point) in self.points.iter().enumerate() {
            if i > 0 {
                text.push('|');
            }
            let (x, y) = point.quantized();
            // Writing into a String cannot fail
            let _ = write!(
                text,
                "{}.{:04},{}.{:04}",
                x / 10_000,
                x % 10_000,
                y / 10_000,
                y % 10_000
            );
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> TapSequence {
        TapSequence::new([
            TapPoint::clamped(0.1, 0.1),
            TapPoint::clamped(0.9, 0.1),
            TapPoint::clamped(0.9, 0.9),
            TapPoint::clamped(0.1, 0.9),
        ])
    }

    #[test]
    fn test_canonical_text() {
        assert_eq!(
            square().canonical().as_str(),
            "0.1000,0.1000|0.9000,0.1000|0.9000,0.9000|0.1000,0.9000"
        );
    }

    #[test]
    fn test_canonical_bounds() {
        let seq = TapSequence::new([
            TapPoint::clamped(0.0, 1.0),
            TapPoint::clamped(0.00004, 0.99996),
            TapPoint::clamped(0.5, 0.25),
            TapPoint::clamped(0.12345678, 0.0),
        ]);
        assert_eq!(
            seq.canonical().as_str(),
            "0.0000,1.0000|0.0000,1.0000|0.5000,0.2500|0.1235,0.0000"
        );
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(TapPoint::new(1.01, 0.5).is_err());
        assert!(TapPoint::new(0.5, -0.1).is_err());
        assert!(TapPoint::new(f64::NAN, 0.5).is_err());
        assert!(TapPoint::new(1.0, 0.0).is_ok());
    }

    #[test]
    fn test_canonical_fits_buffer() {
        let corner = TapPoint::clamped(1.0, 1.0);
        let text = TapSequence::new([corner; TAP_COUNT]).canonical();
        assert_eq!(text.len(), 55);
        assert!(text.len() <= CANONICAL_CAPACITY);
    }

    #[test]
    fn test_deserialize_validates_range() {
        assert!(serde_json::from_str::<TapPoint>(r#"{"x":7.5,"y":-1}"#).is_err());
        assert!(serde_json::from_str::<TapPoint>(r#"{"x":0.5,"y":1.5}"#).is_err());

        let p: TapPoint = serde_json::from_str(r#"{"x":0.25,"y":1.0}"#).unwrap();
        assert_eq!(p.x(), 0.25);
        assert_eq!(p.y(), 1.0);
    }

    #[test]
    fn test_out_of_range_never_reaches_key_text() {
        assert!(matches!(
            TapPoint::new(-0.3, 0.5),
            Err(VaultError::InvalidTapPoint { .. })
        ));
        assert!(TapPoint::new(0.5, f64::INFINITY).is_err());
    }

    #[test]
    fn test_clamped() {
        let p = TapPoint::clamped(-3.0, 7.0);
        assert_eq!(p, TapPoint { x: 0.0, y: 1.0 });
    }

    #[test]
    fn test_from_surface() {
        let p = TapPoint::from_surface(200.0, 50.0, 400.0, 100.0).unwrap();
        assert_eq!(p, TapPoint { x: 0.5, y: 0.5 });

        let outside = TapPoint::from_surface(500.0, -10.0, 400.0, 100.0).unwrap();
        assert_eq!(outside, TapPoint { x: 1.0, y: 0.0 });

        assert!(TapPoint::from_surface(1.0, 1.0, 0.0, 100.0).is_err());
    }

    #[test]
    fn test_sequence_length_enforced() {
        let p = TapPoint::clamped(0.2, 0.2);
        assert!(TapSequence::from_slice(&[p, p, p]).is_err());
        assert!(TapSequence::from_slice(&[p, p, p, p, p]).is_err());
        assert!(TapSequence::from_slice(&[p, p, p, p]).is_ok());

        match TapSequence::from_slice(&[]) {
            Err(VaultError::InvalidTapCount { expected, actual }) => {
                assert_eq!(expected, 4);
                assert_eq!(actual, 0);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }
}
