//! Tunables for booking and tracking.
//!
//! Defaults reproduce the reference flow: a 2 s simulated matching delay,
//! 100 ms steps, a 500 ms pause before completion and a 40 km/h average
//! speed. Params are plain serde structs so they can be loaded from JSON.

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::error::ParamsError;
use crate::geo::Coordinate;
use crate::providers::DEFAULT_PROVIDER_COUNT;
use crate::routing::RouteProviderKind;

/// Pickup used when tracking is opened without one (Bengaluru city centre).
pub const DEFAULT_PICKUP: Coordinate = Coordinate::new(12.9716, 77.5946);

/// Timing and geometry knobs for one tracking run.
#[derive(Debug, Clone, PartialEq, Resource, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingParams {
    /// Simulated wait before a provider is assigned.
    pub matching_delay_ms: u64,
    /// Step timer period.
    pub tick_ms: u64,
    /// Pause between arrival and `completed`.
    pub completion_delay_ms: u64,
    pub average_speed_kmh: f64,
    /// The assigned provider starts this many degrees south-west of pickup.
    pub provider_start_offset_deg: f64,
    pub nearby_provider_count: usize,
    pub fit_padding_px: u32,
    /// Seed for provider synthesis; `None` draws from entropy.
    pub seed: Option<u64>,
    pub route_provider: RouteProviderKind,
}

impl Default for TrackingParams {
    fn default() -> Self {
        Self {
            matching_delay_ms: 2_000,
            tick_ms: 100,
            completion_delay_ms: 500,
            average_speed_kmh: 40.0,
            provider_start_offset_deg: 0.05,
            nearby_provider_count: DEFAULT_PROVIDER_COUNT,
            fit_padding_px: 50,
            seed: None,
            route_provider: RouteProviderKind::default(),
        }
    }
}

impl TrackingParams {
    /// Decode params from JSON; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ParamsError> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.tick_ms == 0 {
            return Err(ParamsError::Invalid("tick_ms must be > 0".to_string()));
        }
        if !(self.average_speed_kmh.is_finite() && self.average_speed_kmh > 0.0) {
            return Err(ParamsError::Invalid(format!(
                "average_speed_kmh must be positive, got {}",
                self.average_speed_kmh
            )));
        }
        Ok(())
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_matching_delay_ms(mut self, delay_ms: u64) -> Self {
        self.matching_delay_ms = delay_ms;
        self
    }

    pub fn with_tick_ms(mut self, tick_ms: u64) -> Self {
        self.tick_ms = tick_ms.max(1);
        self
    }

    pub fn with_completion_delay_ms(mut self, delay_ms: u64) -> Self {
        self.completion_delay_ms = delay_ms;
        self
    }

    pub fn with_average_speed_kmh(mut self, speed_kmh: f64) -> Self {
        self.average_speed_kmh = speed_kmh;
        self
    }

    pub fn with_route_provider(mut self, kind: RouteProviderKind) -> Self {
        self.route_provider = kind;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let params = TrackingParams::from_json_str(r#"{"tick_ms": 250, "seed": 9}"#)
            .expect("valid params");
        assert_eq!(params.tick_ms, 250);
        assert_eq!(params.seed, Some(9));
        assert_eq!(params.matching_delay_ms, 2_000);
        assert_eq!(params.completion_delay_ms, 500);
        assert_eq!(params.route_provider, RouteProviderKind::Fallback);
    }

    #[test]
    fn rejects_zero_tick_and_bad_speed() {
        assert!(TrackingParams::from_json_str(r#"{"tick_ms": 0}"#).is_err());
        assert!(TrackingParams::from_json_str(r#"{"average_speed_kmh": -3.0}"#).is_err());
        assert!(TrackingParams::from_json_str("not json").is_err());
    }

    #[test]
    fn builders_override_fields() {
        let params = TrackingParams::default()
            .with_seed(3)
            .with_tick_ms(0)
            .with_matching_delay_ms(10);
        assert_eq!(params.seed, Some(3));
        assert_eq!(params.tick_ms, 1);
        assert_eq!(params.matching_delay_ms, 10);
    }
}
