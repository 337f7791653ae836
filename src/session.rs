//! Decoy Vault - Capture Session
//!
//! `Idle → Capturing → Finalized`. The state is a plain value: each handler
//! takes the current state and returns the next one.

use crate::tap::{TapPoint, TapSequence, TAP_COUNT};

/// What a capture session is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturePurpose {
    /// Recording a new secret
    Setup,
    /// Trying to unlock the stored envelope
    Recall,
}

/// Tap capture state
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    Capturing {
        purpose: CapturePurpose,
        taps: Vec<TapPoint>,
    },
}

/// Result of feeding one tap
#[derive(Debug, Clone, PartialEq)]
pub enum TapOutcome {
    /// No session active
    Ignored,
    /// Tap recorded; `count` of `TAP_COUNT` collected
    Progress { purpose: CapturePurpose, count: usize },
    /// Fourth tap; the state is back to `Idle`
    Finalized {
        purpose: CapturePurpose,
        sequence: TapSequence,
    },
}

impl CaptureState {
    /// Start a fresh session, dropping any collected taps
    pub fn begin(purpose: CapturePurpose) -> Self {
        CaptureState::Capturing {
            purpose,
            taps: Vec::with_capacity(TAP_COUNT),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, CaptureState::Idle)
    }

    pub fn purpose(&self) -> Option<CapturePurpose> {
        match self {
            CaptureState::Idle => None,
            CaptureState::Capturing { purpose, .. } => Some(*purpose),
        }
    }

    /// Taps collected so far
    pub fn collected(&self) -> &[TapPoint] {
        match self {
            CaptureState::Idle => &[],
            CaptureState::Capturing { taps, .. } => taps,
        }
    }

    /// Feed one tap
    pub fn tap(self, point: TapPoint) -> (CaptureState, TapOutcome) {
        match self {
            CaptureState::Idle => (CaptureState::Idle, TapOutcome::Ignored),
            CaptureState::Capturing { purpose, mut taps } => {
                taps.push(point);

                if taps.len() < TAP_COUNT {
                    let count = taps.len();
                    return (
                        CaptureState::Capturing { purpose, taps },
                        TapOutcome::Progress { purpose, count },
                    );
                }

                match TapSequence::from_slice(&taps) {
                    Ok(sequence) => (
                        CaptureState::Idle,
                        TapOutcome::Finalized { purpose, sequence },
                    ),
                    // Unreachable while taps never exceed TAP_COUNT
                    Err(_) => (CaptureState::Idle, TapOutcome::Ignored),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(v: f64) -> TapPoint {
        TapPoint::clamped(v, v)
    }

    #[test]
    fn test_idle_ignores_taps() {
        let (state, outcome) = CaptureState::Idle.tap(p(0.5));
        assert!(state.is_idle());
        assert_eq!(outcome, TapOutcome::Ignored);
    }

    #[test]
    fn test_four_taps_finalize() {
        let mut state = CaptureState::begin(CapturePurpose::Setup);

        for i in 1..TAP_COUNT {
            let (next, outcome) = state.tap(p(i as f64 / 10.0));
            assert_eq!(
                outcome,
                TapOutcome::Progress {
                    purpose: CapturePurpose::Setup,
                    count: i
                }
            );
            assert_eq!(next.collected().len(), i);
            state = next;
        }

        let (state, outcome) = state.tap(p(0.9));
        assert!(state.is_idle());
        match outcome {
            TapOutcome::Finalized { purpose, sequence } => {
                assert_eq!(purpose, CapturePurpose::Setup);
                assert_eq!(sequence.points()[0], p(0.1));
                assert_eq!(sequence.points()[3], p(0.9));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_begin_discards_previous_taps() {
        let state = CaptureState::begin(CapturePurpose::Recall);
        let (state, _) = state.tap(p(0.2));
        let (state, _) = state.tap(p(0.3));
        assert_eq!(state.collected().len(), 2);

        let restarted = CaptureState::begin(CapturePurpose::Recall);
        assert!(restarted.collected().is_empty());
        assert_eq!(restarted.purpose(), Some(CapturePurpose::Recall));
    }
}
