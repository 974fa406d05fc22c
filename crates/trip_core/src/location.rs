//! Pickup screening: rejects geocoded locations that sit on water.
//!
//! The name check is a plain substring match and over-rejects land addresses
//! that merely mention water ("River Road", "Baywater Street"). That is the
//! current policy and is kept as-is.

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// One candidate returned by the geocoding collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub coordinate: Coordinate,
    pub display_name: String,
    /// The provider's `type` tag (e.g. `residential`, `water`).
    pub location_type: String,
    /// The provider's `class` tag (e.g. `highway`, `natural`).
    pub class: String,
    /// Untouched provider payload.
    #[serde(default)]
    pub raw: serde_json::Value,
}

impl ResolvedLocation {
    pub fn new(
        coordinate: Coordinate,
        display_name: impl Into<String>,
        location_type: impl Into<String>,
        class: impl Into<String>,
    ) -> Self {
        Self {
            coordinate,
            display_name: display_name.into(),
            location_type: location_type.into(),
            class: class.into(),
            raw: serde_json::Value::Null,
        }
    }
}

/// Which screening rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WaterPolicy {
    /// Picked from the search list: full tag and name token set.
    #[default]
    SearchResult,
    /// Picked by clicking the map: tag rules plus a narrower name token set.
    MapClick,
}

impl WaterPolicy {
    fn name_tokens(self) -> &'static [&'static str] {
        match self {
            WaterPolicy::SearchResult => &["ocean", "sea", "bay", "lake", "river", "pond"],
            WaterPolicy::MapClick => &["ocean", "sea", "bay"],
        }
    }
}

const NATURAL_WATER_TYPES: [&str; 3] = ["water", "bay", "ocean"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationVerdict {
    Accepted,
    OverWater,
}

impl LocationVerdict {
    pub fn is_rejected(self) -> bool {
        self == LocationVerdict::OverWater
    }
}

/// Screen a location under the given policy.
pub fn classify(location: &ResolvedLocation, policy: WaterPolicy) -> LocationVerdict {
    let location_type = location.location_type.to_lowercase();
    let class = location.class.to_lowercase();
    let name = location.display_name.to_lowercase();

    let waterway = location_type == "waterway" || class == "waterway";
    let natural_water =
        class == "natural" && NATURAL_WATER_TYPES.contains(&location_type.as_str());
    let named_water = policy
        .name_tokens()
        .iter()
        .any(|token| name.contains(token));

    if waterway || natural_water || named_water {
        log::debug!(
            "rejecting '{}' as water (type={}, class={}, policy={:?})",
            location.display_name,
            location.location_type,
            location.class,
            policy
        );
        LocationVerdict::OverWater
    } else {
        LocationVerdict::Accepted
    }
}

/// Search-result screening: true means "over water, reject".
pub fn is_over_water(location: &ResolvedLocation) -> bool {
    classify(location, WaterPolicy::SearchResult).is_rejected()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(name: &str, location_type: &str, class: &str) -> ResolvedLocation {
        ResolvedLocation::new(Coordinate::new(12.97, 77.59), name, location_type, class)
    }

    #[test]
    fn waterway_tags_reject() {
        assert!(is_over_water(&loc("Canal", "waterway", "")));
        assert!(is_over_water(&loc("Canal", "canal", "waterway")));
        assert!(is_over_water(&loc("Canal", "WATERWAY", "")));
    }

    #[test]
    fn natural_water_types_reject() {
        assert!(is_over_water(&loc("Somewhere", "bay", "natural")));
        assert!(is_over_water(&loc("Somewhere", "Water", "Natural")));
        assert!(is_over_water(&loc("Somewhere", "ocean", "natural")));
        assert!(!is_over_water(&loc("Somewhere", "peak", "natural")));
    }

    #[test]
    fn name_tokens_reject_case_insensitively() {
        assert!(is_over_water(&loc("Ulsoor LAKE, Bengaluru", "attraction", "tourism")));
        assert!(is_over_water(&loc("Arabian Sea", "", "")));
    }

    #[test]
    fn street_names_mentioning_water_are_over_rejected() {
        assert!(is_over_water(&loc("River Road, Bengaluru", "residential", "highway")));
    }

    #[test]
    fn plain_street_address_is_accepted() {
        let street = loc("MG Road, Bengaluru, Karnataka, India", "residential", "highway");
        assert!(!is_over_water(&street));
    }

    #[test]
    fn map_click_policy_ignores_lake_river_pond() {
        let lake = loc("Ulsoor Lake", "attraction", "tourism");
        assert_eq!(classify(&lake, WaterPolicy::MapClick), LocationVerdict::Accepted);
        assert_eq!(
            classify(&lake, WaterPolicy::SearchResult),
            LocationVerdict::OverWater
        );
        let bay = loc("Bay of Bengal", "", "");
        assert!(classify(&bay, WaterPolicy::MapClick).is_rejected());
    }
}
