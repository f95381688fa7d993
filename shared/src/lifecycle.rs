//! Request lifecycle shared by the estimate, confirm and history screens.
//!
//! A screen is `Idle`, has a request in flight, or is cooling down after one.
//! Every dispatched request gets a fresh generation number; the matching
//! response event must present that number or it is ignored. Cancelling bumps
//! the generation, so an abandoned request's late result can never touch
//! state. The cooldown window applies after success, failure and cancellation
//! alike.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::AppError;

/// How long the submit affordance stays disabled after a request settles.
pub const REQUEST_COOLDOWN: Duration = Duration::from_secs(3);

/// How long a surfaced error stays visible unless dismissed first.
pub const ERROR_DISPLAY_WINDOW: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RequestPhase {
    #[default]
    Idle,
    Requesting,
    CoolingDown,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestLifecycle {
    phase: RequestPhase,
    generation: u64,
}

impl RequestLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> RequestPhase {
        self.phase
    }

    pub fn can_submit(&self) -> bool {
        self.phase == RequestPhase::Idle
    }

    pub fn is_requesting(&self) -> bool {
        self.phase == RequestPhase::Requesting
    }

    pub fn is_cooling_down(&self) -> bool {
        self.phase == RequestPhase::CoolingDown
    }

    /// Starts a new request and returns its generation.
    pub fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.phase = RequestPhase::Requesting;
        self.generation
    }

    /// Whether a response carrying this generation may be applied.
    pub fn accepts(&self, generation: u64) -> bool {
        self.phase == RequestPhase::Requesting && generation == self.generation
    }

    /// Settles the in-flight request and enters the cooldown window. Returns
    /// the generation the cooldown timer should carry.
    pub fn finish(&mut self) -> u64 {
        self.phase = RequestPhase::CoolingDown;
        self.generation
    }

    /// Abandons the in-flight request. The generation bump orphans its
    /// eventual result; the screen cools down as after any other completion.
    pub fn cancel(&mut self) -> u64 {
        self.generation += 1;
        self.phase = RequestPhase::CoolingDown;
        self.generation
    }

    /// Applies a cooldown expiry. Returns true when it was current and the
    /// screen went back to `Idle`.
    pub fn cooldown_finished(&mut self, generation: u64) -> bool {
        if self.phase == RequestPhase::CoolingDown && generation == self.generation {
            self.phase = RequestPhase::Idle;
            true
        } else {
            false
        }
    }
}

/// One displayed error with an epoch guarding its auto-clear timer. A timer
/// started for epoch N clears nothing once a newer error has taken the slot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorSlot {
    active: Option<AppError>,
    epoch: u64,
}

impl ErrorSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&AppError> {
        self.active.as_ref()
    }

    /// Shows an error and returns the epoch its expiry timer must present.
    pub fn set(&mut self, error: AppError) -> u64 {
        self.epoch += 1;
        self.active = Some(error);
        self.epoch
    }

    pub fn clear(&mut self) {
        self.active = None;
    }

    /// Applies an expiry timer. Returns true when something was cleared.
    pub fn expire(&mut self, epoch: u64) -> bool {
        if epoch == self.epoch && self.active.is_some() {
            self.active = None;
            true
        } else {
            false
        }
    }
}
