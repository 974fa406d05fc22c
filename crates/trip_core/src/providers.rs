//! Nearby provider synthesis: a ring of mock providers around a pickup.
//!
//! Providers are placed evenly in angle around the centre at a random radius
//! between 30% and 100% of [`BASE_RADIUS_DEG`]. The random source is injected
//! so tests can seed it; production uses entropy.

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// Ring radius in degrees.
pub const BASE_RADIUS_DEG: f64 = 0.1;

/// Lower bound of the radius as a fraction of [`BASE_RADIUS_DEG`].
const MIN_RADIUS_FRACTION: f64 = 0.3;

/// How many providers the booking flow shows by default.
pub const DEFAULT_PROVIDER_COUNT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: String,
    pub display_name: String,
    pub position: Coordinate,
}

/// Place `count` providers around `center`, drawing radii from `rng`.
pub fn generate_nearby<R: Rng>(
    center: Coordinate,
    count: usize,
    rng: &mut R,
) -> Vec<Provider> {
    (0..count)
        .map(|i| {
            let angle = (PI * 2.0 * i as f64) / count as f64;
            let fraction = MIN_RADIUS_FRACTION + rng.gen::<f64>() * (1.0 - MIN_RADIUS_FRACTION);
            let radius = BASE_RADIUS_DEG * fraction;
            Provider {
                id: format!("provider_{}", i + 1),
                display_name: format!("Provider {}", i + 1),
                position: center.offset(radius * angle.cos(), radius * angle.sin()),
            }
        })
        .collect()
}

/// Owns the random source used for provider placement.
pub struct ProviderSynthesizer {
    rng: StdRng,
}

impl ProviderSynthesizer {
    /// `Some(seed)` gives reproducible rings; `None` seeds from entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    pub fn generate(&mut self, center: Coordinate, count: usize) -> Vec<Provider> {
        generate_nearby(center, count, &mut self.rng)
    }
}

impl Default for ProviderSynthesizer {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_has_expected_shape() {
        let center = Coordinate::new(12.9716, 77.5946);
        let providers = ProviderSynthesizer::new(None).generate(center, DEFAULT_PROVIDER_COUNT);

        assert_eq!(providers.len(), 5);
        for (i, provider) in providers.iter().enumerate() {
            assert_eq!(provider.id, format!("provider_{}", i + 1));
            assert_eq!(provider.display_name, format!("Provider {}", i + 1));
            let radius = provider.position.degrees_to(&center);
            assert!(
                (0.03 - 1e-9..=0.1 + 1e-9).contains(&radius),
                "radius {radius} out of bounds"
            );
        }
    }

    #[test]
    fn seeded_synthesizers_agree() {
        let center = Coordinate::new(21.1702, 72.8311);
        let a = ProviderSynthesizer::new(Some(7)).generate(center, 5);
        let b = ProviderSynthesizer::new(Some(7)).generate(center, 5);
        assert_eq!(a, b);
    }

    #[test]
    fn first_provider_sits_due_north() {
        let center = Coordinate::new(0.0, 0.0);
        let providers = ProviderSynthesizer::new(Some(1)).generate(center, 4);
        let first = providers[0].position;
        assert!(first.latitude > 0.0);
        assert!(first.longitude.abs() < 1e-12);
    }

    #[test]
    fn zero_count_is_empty() {
        let providers = ProviderSynthesizer::new(Some(1)).generate(Coordinate::new(0.0, 0.0), 0);
        assert!(providers.is_empty());
    }
}
