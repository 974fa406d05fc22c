//! Fare estimation for a confirmed pickup.
//!
//! The current policy is a flat placeholder: every pickup costs [`BASE_FARE`].
//! Callers should treat the estimate as opaque and ask again per pickup rather
//! than caching it, so a distance/time based policy can replace it later.

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// Base fare in currency units.
pub const BASE_FARE: u32 = 245;

/// Fare used by tracking when the booking side did not forward one.
pub const DEFAULT_FARE: u32 = BASE_FARE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FareEstimate {
    pub base_fare: u32,
    pub total: u32,
}

/// Estimate the fare for a pickup.
pub fn estimate_fare(_pickup: Coordinate) -> FareEstimate {
    FareEstimate {
        base_fare: BASE_FARE,
        total: BASE_FARE,
    }
}
