//! Geographic helpers: coordinates, great-circle distance and path shaping.
//!
//! This module provides:
//!
//! - **Coordinate**: latitude-first WGS84 value type
//! - **Distance calculations**: Haversine distance and accumulated path length
//! - **Interpolation**: flat lat/lng `lerp`, good enough at city scale
//! - **Curvature**: the two-sinusoid offset used to bow synthetic routes

use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Mean Earth radius in metres (same value web map libraries use).
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Latitude-first geographic coordinate in decimal degrees.
///
/// Not `Eq`; compare through a threshold with [`Coordinate::approx_eq`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Shift by a delta in degrees.
    pub fn offset(&self, d_lat: f64, d_lng: f64) -> Self {
        Self::new(self.latitude + d_lat, self.longitude + d_lng)
    }

    /// True when both axes differ by at most `epsilon_deg`.
    pub fn approx_eq(&self, other: &Coordinate, epsilon_deg: f64) -> bool {
        (self.latitude - other.latitude).abs() <= epsilon_deg
            && (self.longitude - other.longitude).abs() <= epsilon_deg
    }

    /// Planar distance in degrees, used for the provider ring bounds.
    pub fn degrees_to(&self, other: &Coordinate) -> f64 {
        let d_lat = self.latitude - other.latitude;
        let d_lng = self.longitude - other.longitude;
        (d_lat * d_lat + d_lng * d_lng).sqrt()
    }

    /// Display label used when no address is available, e.g. `12.9716, 77.5946`.
    pub fn short_label(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// Haversine distance between two coordinates in metres.
pub fn distance_meters(a: Coordinate, b: Coordinate) -> f64 {
    let (lat1, lon1) = (a.latitude.to_radians(), a.longitude.to_radians());
    let (lat2, lon2) = (b.latitude.to_radians(), b.longitude.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let sin_dlat = (dlat * 0.5).sin();
    let sin_dlon = (dlon * 0.5).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

/// Sum of consecutive-pair distances along `points`, in metres.
///
/// This is the accumulation ETA is derived from; it is never the straight
/// origin-to-destination distance.
pub fn path_length_meters(points: &[Coordinate]) -> f64 {
    points
        .windows(2)
        .map(|pair| distance_meters(pair[0], pair[1]))
        .sum()
}

/// Linear interpolation in lat/lng space. `t` is clamped to `[0, 1]`.
pub fn lerp(a: Coordinate, b: Coordinate, t: f64) -> Coordinate {
    let t = t.clamp(0.0, 1.0);
    Coordinate::new(
        a.latitude + (b.latitude - a.latitude) * t,
        a.longitude + (b.longitude - a.longitude) * t,
    )
}

/// Curvature perturbation in degrees for synthetic paths.
///
/// Two sinusoids of different frequency; both vanish at `t = 0` and `t = 1`
/// so the path still starts and ends on its endpoints.
pub fn curved_offset(t: f64) -> f64 {
    let primary = (t * PI * 2.0).sin() * 0.0015;
    let secondary = (t * PI * 3.0).sin() * 0.001;
    primary + secondary
}

/// Minutes needed to cover `distance_km` at `speed_kmh`, rounded up.
pub fn eta_minutes(distance_km: f64, speed_kmh: f64) -> u32 {
    if distance_km <= 0.0 || speed_kmh <= 0.0 {
        return 0;
    }
    ((distance_km / speed_kmh) * 60.0).ceil() as u32
}
