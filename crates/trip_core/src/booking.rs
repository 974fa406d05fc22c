//! Booking flow: choose a pickup, preview nearby providers and the fare,
//! then confirm into a [`TripRequest`] for tracking.
//!
//! A pickup can come from three places: a search result, a point clicked on
//! the map, or the device's current position. Whichever path is taken, an
//! accepted pickup replaces the previous pickup marker, re-synthesizes the
//! nearby provider ring and re-estimates the fare.

use crate::error::BookingError;
use crate::geo::Coordinate;
use crate::geocoding::{reverse_label, search_or_empty, Geocoder};
use crate::location::{classify, LocationVerdict, ResolvedLocation, WaterPolicy};
use crate::map::{MapSurface, MarkerId, MarkerKind};
use crate::pricing::{estimate_fare, FareEstimate, DEFAULT_FARE};
use crate::providers::{Provider, ProviderSynthesizer};
use crate::scenario::{TrackingParams, DEFAULT_PICKUP};

/// Viewport padding when framing the pickup and its nearby providers.
pub const NEARBY_FIT_PADDING_PX: u32 = 80;

/// What booking hands to tracking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripRequest {
    pub fare: u32,
    pub pickup: Coordinate,
}

impl Default for TripRequest {
    fn default() -> Self {
        Self {
            fare: DEFAULT_FARE,
            pickup: DEFAULT_PICKUP,
        }
    }
}

impl TripRequest {
    /// Missing values fall back to [`DEFAULT_FARE`] and [`DEFAULT_PICKUP`].
    pub fn from_params(fare: Option<u32>, pickup: Option<Coordinate>) -> Self {
        Self {
            fare: fare.unwrap_or(DEFAULT_FARE),
            pickup: pickup.unwrap_or(DEFAULT_PICKUP),
        }
    }

    /// Build from raw navigation parameters. Unparseable values count as
    /// missing, and the pickup is only used when both axes parse.
    pub fn from_query(fare: Option<&str>, lat: Option<&str>, lng: Option<&str>) -> Self {
        let fare = fare.and_then(|f| f.trim().parse::<u32>().ok());
        let parse = |v: Option<&str>| {
            v.and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite())
        };
        let pickup = match (parse(lat), parse(lng)) {
            (Some(lat), Some(lng)) => Some(Coordinate::new(lat, lng)),
            _ => None,
        };
        Self::from_params(fare, pickup)
    }
}

/// The accepted pickup and the label shown for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Pickup {
    pub coordinate: Coordinate,
    pub label: String,
}

/// Booking state for one booking screen. Owns its map surface and releases it
/// when dropped.
pub struct BookingFlow {
    map: Box<dyn MapSurface>,
    synthesizer: ProviderSynthesizer,
    provider_count: usize,
    expert_type: Option<String>,
    search_results: Vec<ResolvedLocation>,
    pickup: Option<Pickup>,
    pickup_marker: Option<MarkerId>,
    providers: Vec<Provider>,
    provider_markers: Vec<MarkerId>,
    fare: Option<FareEstimate>,
}

impl BookingFlow {
    pub fn new(map: Box<dyn MapSurface>, params: &TrackingParams) -> Self {
        Self {
            map,
            synthesizer: ProviderSynthesizer::new(params.seed),
            provider_count: params.nearby_provider_count,
            expert_type: None,
            search_results: Vec::new(),
            pickup: None,
            pickup_marker: None,
            providers: Vec::new(),
            provider_markers: Vec::new(),
            fare: None,
        }
    }

    /// Kind of expert requested on the previous screen; carried for display.
    pub fn with_expert_type(mut self, expert_type: impl Into<String>) -> Self {
        self.expert_type = Some(expert_type.into());
        self
    }

    pub fn expert_type(&self) -> Option<&str> {
        self.expert_type.as_deref()
    }

    pub fn pickup(&self) -> Option<&Pickup> {
        self.pickup.as_ref()
    }

    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    pub fn fare(&self) -> Option<FareEstimate> {
        self.fare
    }

    pub fn search_results(&self) -> &[ResolvedLocation] {
        &self.search_results
    }

    /// Run a free-text search. Failures and blank queries leave an empty list.
    pub fn search(&mut self, geocoder: &dyn Geocoder, query: &str) -> &[ResolvedLocation] {
        self.search_results = search_or_empty(geocoder, query);
        &self.search_results
    }

    /// Accept a search candidate as the pickup unless it sits on water.
    /// The candidate list is cleared either way.
    pub fn select_search_result(&mut self, location: &ResolvedLocation) -> Result<(), BookingError> {
        self.search_results.clear();
        if classify(location, WaterPolicy::SearchResult) == LocationVerdict::OverWater {
            log::info!("rejected search result '{}': over water", location.display_name);
            return Err(BookingError::OverWater);
        }
        self.set_pickup(location.coordinate, location.display_name.clone());
        Ok(())
    }

    /// Accept a clicked map point. The point is screened with the map-click
    /// policy when reverse lookup knows the place; a failed lookup accepts.
    pub fn select_map_point(
        &mut self,
        geocoder: &dyn Geocoder,
        coordinate: Coordinate,
    ) -> Result<(), BookingError> {
        match geocoder.reverse(coordinate) {
            Ok(Some(location)) if classify(&location, WaterPolicy::MapClick).is_rejected() => {
                log::info!("rejected map point {}: over water", coordinate);
                return Err(BookingError::OverWater);
            }
            Ok(_) => {}
            Err(err) => log::warn!("reverse lookup for {} failed, accepting: {}", coordinate, err),
        }
        self.set_pickup(coordinate, coordinate.short_label());
        Ok(())
    }

    /// Use the device position. A positioning failure is passed through with
    /// booking state untouched; no substitute coordinate is invented.
    pub fn use_current_location(
        &mut self,
        geocoder: &dyn Geocoder,
        position: Result<Coordinate, BookingError>,
    ) -> Result<(), BookingError> {
        let coordinate = position.map_err(|err| {
            log::warn!("current location unavailable: {}", err);
            err
        })?;
        let label = reverse_label(geocoder, coordinate);
        self.set_pickup(coordinate, label);
        Ok(())
    }

    /// Confirm the booking. `None` when no pickup has been chosen.
    pub fn confirm_booking(&self) -> Option<TripRequest> {
        let pickup = self.pickup.as_ref()?;
        let fare = self.fare.map_or(DEFAULT_FARE, |fare| fare.total);
        log::info!("booking confirmed at {} for {}", pickup.coordinate, fare);
        Some(TripRequest {
            fare,
            pickup: pickup.coordinate,
        })
    }

    fn set_pickup(&mut self, coordinate: Coordinate, label: String) {
        if let Some(marker) = self.pickup_marker.take() {
            self.map.remove_marker(marker);
        }
        self.pickup_marker = Some(
            self.map
                .place_marker(MarkerKind::Pickup, coordinate, Some(label.as_str())),
        );
        self.pickup = Some(Pickup { coordinate, label });
        self.show_nearby_providers(coordinate);
        self.fare = Some(estimate_fare(coordinate));
    }

    fn show_nearby_providers(&mut self, center: Coordinate) {
        for marker in self.provider_markers.drain(..) {
            self.map.remove_marker(marker);
        }
        self.providers = self.synthesizer.generate(center, self.provider_count);
        for provider in &self.providers {
            let marker = self.map.place_marker(
                MarkerKind::NearbyProvider,
                provider.position,
                Some(provider.display_name.as_str()),
            );
            self.provider_markers.push(marker);
        }

        let mut frame = Vec::with_capacity(self.providers.len() + 1);
        frame.push(center);
        frame.extend(self.providers.iter().map(|p| p.position));
        self.map.fit_bounds(&frame, NEARBY_FIT_PADDING_PX);
    }
}

impl Drop for BookingFlow {
    fn drop(&mut self) {
        self.map.release();
    }
}
