//! Prediction phase state machine
//!
//! One prediction walks a fixed path with no retries:
//!
//! 1. Idle            → CallingRemote   (on: Start)
//! 2. CallingRemote   → Done            (on: RemoteSucceeded)
//! 3. CallingRemote   → RunningFallback (on: RemoteFailed)
//! 4. RunningFallback → Done            (on: FallbackComplete)
//! 5. Done            → Done            (terminal)

use crate::errors::{Result, SoilSyncError};
use serde::{Deserialize, Serialize};

/// Phases of a single prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PredictionPhase {
    Idle,
    CallingRemote,
    RunningFallback,
    Done,
}

/// Events that move a prediction forward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEvent {
    Start,
    RemoteSucceeded,
    RemoteFailed,
    FallbackComplete,
}

impl PredictionPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PredictionPhase::Done)
    }

    /// Attempt a transition; anything off the documented path is rejected
    pub fn transition(&self, event: PhaseEvent) -> Result<PredictionPhase> {
        use PhaseEvent::*;
        use PredictionPhase::*;

        let next = match (self, event) {
            (Idle, Start) => CallingRemote,
            (CallingRemote, RemoteSucceeded) => Done,
            (CallingRemote, RemoteFailed) => RunningFallback,
            (RunningFallback, FallbackComplete) => Done,
            (Done, _) => Done,
            (from, event) => {
                return Err(SoilSyncError::InvalidTransition {
                    from: format!("{:?}", from),
                    to: format!("(via {:?})", event),
                });
            }
        };

        Ok(next)
    }
}
