//! Geocoding collaborator: free-text search and reverse lookup.
//!
//! The engine never fails because of geocoding. [`search_or_empty`] turns
//! errors into an empty candidate list and [`reverse_label`] falls back to a
//! coordinate label. The Nominatim client lives behind the `nominatim`
//! feature; its payload decoding is always compiled.

use serde::Deserialize;

use crate::error::GeocodeError;
use crate::geo::Coordinate;
use crate::location::ResolvedLocation;

/// Candidates requested per search.
pub const SEARCH_LIMIT: usize = 10;

pub trait Geocoder: Send + Sync {
    /// Forward geocode a query into candidate locations.
    fn search(&self, query: &str, limit: usize) -> Result<Vec<ResolvedLocation>, GeocodeError>;

    /// Reverse geocode a coordinate. `Ok(None)` when nothing is known there.
    fn reverse(&self, coordinate: Coordinate) -> Result<Option<ResolvedLocation>, GeocodeError>;
}

/// Search, degrading to no candidates on any failure or a blank query.
pub fn search_or_empty(geocoder: &dyn Geocoder, query: &str) -> Vec<ResolvedLocation> {
    if query.trim().is_empty() {
        return Vec::new();
    }
    match geocoder.search(query, SEARCH_LIMIT) {
        Ok(results) => results,
        Err(err) => {
            log::warn!("search for '{}' failed: {}", query, err);
            Vec::new()
        }
    }
}

/// Human label for a coordinate: the reverse-geocoded name, or `lat, lng`.
pub fn reverse_label(geocoder: &dyn Geocoder, coordinate: Coordinate) -> String {
    match geocoder.reverse(coordinate) {
        Ok(Some(location)) if !location.display_name.trim().is_empty() => location.display_name,
        Ok(_) => coordinate.short_label(),
        Err(err) => {
            log::warn!("reverse lookup for {} failed: {}", coordinate, err);
            coordinate.short_label()
        }
    }
}

/// One Nominatim `format=json` record. Coordinates arrive as strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
    #[serde(default, rename = "type")]
    place_type: String,
    #[serde(default)]
    class: String,
}

fn place_to_location(
    place: NominatimPlace,
    raw: serde_json::Value,
) -> Result<ResolvedLocation, GeocodeError> {
    let latitude: f64 = place
        .lat
        .parse()
        .map_err(|_| GeocodeError::Malformed(format!("bad lat '{}'", place.lat)))?;
    let longitude: f64 = place
        .lon
        .parse()
        .map_err(|_| GeocodeError::Malformed(format!("bad lon '{}'", place.lon)))?;
    Ok(ResolvedLocation {
        coordinate: Coordinate::new(latitude, longitude),
        display_name: place.display_name,
        location_type: place.place_type,
        class: place.class,
        raw,
    })
}

fn value_to_location(value: serde_json::Value) -> Result<ResolvedLocation, GeocodeError> {
    let place: NominatimPlace = serde_json::from_value(value.clone())
        .map_err(|err| GeocodeError::Malformed(err.to_string()))?;
    place_to_location(place, value)
}

/// Decode a Nominatim `/search` body. Records that fail to decode are skipped.
pub fn decode_search_body(body: &str) -> Result<Vec<ResolvedLocation>, GeocodeError> {
    let values: Vec<serde_json::Value> =
        serde_json::from_str(body).map_err(|err| GeocodeError::Malformed(err.to_string()))?;
    Ok(values
        .into_iter()
        .filter_map(|value| match value_to_location(value) {
            Ok(location) => Some(location),
            Err(err) => {
                log::debug!("skipping search record: {}", err);
                None
            }
        })
        .collect())
}

/// Decode a Nominatim `/reverse` body. An `{"error": ...}` answer is `None`.
pub fn decode_reverse_body(body: &str) -> Result<Option<ResolvedLocation>, GeocodeError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|err| GeocodeError::Malformed(err.to_string()))?;
    if value.get("error").is_some() {
        return Ok(None);
    }
    value_to_location(value).map(Some)
}

#[cfg(feature = "nominatim")]
pub mod nominatim {
    use std::time::Duration;

    use reqwest::{blocking::Client, Url};

    use super::*;

    const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
    const USER_AGENT: &str = concat!("trip_core/", env!("CARGO_PKG_VERSION"));

    /// Geocodes via a Nominatim HTTP endpoint.
    #[derive(Debug, Clone)]
    pub struct NominatimGeocoder {
        client: Client,
        endpoint: String,
    }

    impl NominatimGeocoder {
        /// Create a geocoder for the given endpoint
        /// (e.g. `https://nominatim.openstreetmap.org`).
        pub fn new(endpoint: &str) -> Result<Self, GeocodeError> {
            let client = Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .user_agent(USER_AGENT)
                .build()?;
            Ok(Self {
                client,
                endpoint: endpoint.trim_end_matches('/').to_string(),
            })
        }

        fn url(&self, path: &str) -> Result<Url, GeocodeError> {
            Url::parse(&format!("{}/{}", self.endpoint, path))
                .map_err(|err| GeocodeError::Unavailable(format!("bad endpoint: {}", err)))
        }
    }

    impl Geocoder for NominatimGeocoder {
        fn search(
            &self,
            query: &str,
            limit: usize,
        ) -> Result<Vec<ResolvedLocation>, GeocodeError> {
            let mut url = self.url("search")?;
            url.query_pairs_mut()
                .append_pair("format", "json")
                .append_pair("q", query)
                .append_pair("limit", &limit.to_string())
                .append_pair("addressdetails", "1");
            let body = self.client.get(url).send()?.text()?;
            decode_search_body(&body)
        }

        fn reverse(
            &self,
            coordinate: Coordinate,
        ) -> Result<Option<ResolvedLocation>, GeocodeError> {
            let mut url = self.url("reverse")?;
            url.query_pairs_mut()
                .append_pair("format", "json")
                .append_pair("lat", &coordinate.latitude.to_string())
                .append_pair("lon", &coordinate.longitude.to_string());
            let body = self.client.get(url).send()?.text()?;
            decode_reverse_body(&body)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Offline;

    impl Geocoder for Offline {
        fn search(&self, _: &str, _: usize) -> Result<Vec<ResolvedLocation>, GeocodeError> {
            Err(GeocodeError::Unavailable("offline".to_string()))
        }

        fn reverse(&self, _: Coordinate) -> Result<Option<ResolvedLocation>, GeocodeError> {
            Err(GeocodeError::Unavailable("offline".to_string()))
        }
    }

    #[test]
    fn failures_degrade_to_empty_and_coordinate_label() {
        assert!(search_or_empty(&Offline, "MG Road").is_empty());
        let label = reverse_label(&Offline, Coordinate::new(12.97164, 77.59461));
        assert_eq!(label, "12.9716, 77.5946");
    }

    #[test]
    fn blank_query_is_empty_without_asking() {
        assert!(search_or_empty(&Offline, "   ").is_empty());
    }

    #[test]
    fn decodes_search_records_and_keeps_raw_payload() {
        let body = r#"[
            {"lat": "12.9756", "lon": "77.6066", "display_name": "MG Road, Bengaluru",
             "type": "primary", "class": "highway", "place_id": 1},
            {"lat": "not-a-number", "lon": "77.0", "display_name": "Broken"},
            {"lat": "12.9800", "lon": "77.6200", "display_name": "Ulsoor Lake",
             "type": "water", "class": "natural"}
        ]"#;
        let results = decode_search_body(body).expect("decoded");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].coordinate, Coordinate::new(12.9756, 77.6066));
        assert_eq!(results[0].location_type, "primary");
        assert_eq!(results[0].class, "highway");
        assert_eq!(results[0].raw["place_id"], 1);
        assert_eq!(results[1].display_name, "Ulsoor Lake");
    }

    #[test]
    fn decodes_reverse_answers() {
        let body = r#"{"lat": "12.97", "lon": "77.59", "display_name": "Cubbon Park"}"#;
        let place = decode_reverse_body(body).expect("ok").expect("place");
        assert_eq!(place.display_name, "Cubbon Park");
        assert!(place.location_type.is_empty());

        let missing = decode_reverse_body(r#"{"error": "Unable to geocode"}"#).expect("ok");
        assert!(missing.is_none());
        assert!(decode_reverse_body("nope").is_err());
    }
}
