//! Pluggable route providers: trait abstraction for routing backends.
//!
//! Two implementations, selectable via [`RouteProviderKind`]:
//!
//! - **`FallbackRouteProvider`**: Synthesized curved path. Zero dependencies, never fails.
//! - **`OsrmRouteProvider`** (feature `osrm`): Calls a local/remote OSRM HTTP endpoint.
//!
//! Tracking never talks to a provider directly; it goes through [`fetch_route`],
//! which turns every failure into a usable route. The provider is stored as a
//! `Box<dyn RouteProvider>` ECS resource.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use bevy_ecs::prelude::Resource;
use lru::LruCache;
use serde::{Deserialize, Serialize};

use crate::error::{RouteBuildError, RouteError};
use crate::geo::{curved_offset, lerp, path_length_meters, Coordinate};

pub mod osrm;

// ---------------------------------------------------------------------------
// Core types
// ---------------------------------------------------------------------------

/// Default number of segments in a synthesized route (31 points).
pub const DEFAULT_FALLBACK_STEPS: usize = 30;

/// Longitude offset as a fraction of the latitude offset on synthetic paths.
const LNG_CURVE_FACTOR: f64 = 0.7;

/// Where a route came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteSource {
    /// Road geometry returned by the routing service.
    Routed,
    /// The service answered but had no route; straight `[start, end]`.
    Direct,
    /// Synthesized because the service failed.
    Fallback,
}

/// Ordered path from origin to destination, always at least two points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    points: Vec<Coordinate>,
    source: RouteSource,
}

impl Route {
    pub fn new(points: Vec<Coordinate>, source: RouteSource) -> Result<Self, RouteBuildError> {
        if points.len() < 2 {
            return Err(RouteBuildError(points.len()));
        }
        Ok(Self { points, source })
    }

    /// The degenerate two-point route.
    pub fn direct(start: Coordinate, end: Coordinate) -> Self {
        Self {
            points: vec![start, end],
            source: RouteSource::Direct,
        }
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn source(&self) -> RouteSource {
        self.source
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// A route holds at least two points, so this is never true.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Coordinate> {
        self.points.get(index).copied()
    }

    pub fn origin(&self) -> Coordinate {
        self.points[0]
    }

    pub fn destination(&self) -> Coordinate {
        self.points[self.points.len() - 1]
    }

    /// Total path length in metres.
    pub fn length_meters(&self) -> f64 {
        path_length_meters(&self.points)
    }

    /// Path length from point `index` to the destination, in metres.
    /// Zero at or past the last point.
    pub fn remaining_meters(&self, index: usize) -> f64 {
        match self.points.get(index..) {
            Some(rest) => path_length_meters(rest),
            None => 0.0,
        }
    }
}

/// Synthesize a visibly curved path from `start` to `end`.
///
/// Samples `steps + 1` points along the straight line and bows each one by
/// [`curved_offset`]; the longitude offset is mirrored and scaled so the path
/// does not run diagonal-straight. The offset vanishes at both ends.
pub fn generate_fallback_route(start: Coordinate, end: Coordinate, steps: usize) -> Route {
    let steps = steps.max(1);
    let points = (0..=steps)
        .map(|i| {
            let t = i as f64 / steps as f64;
            let base = lerp(start, end, t);
            let curvature = curved_offset(t);
            base.offset(curvature, -curvature * LNG_CURVE_FACTOR)
        })
        .collect();
    Route {
        points,
        source: RouteSource::Fallback,
    }
}

/// Trait for routing backends. Implementations must be `Send + Sync` so the
/// provider can be stored as a shared ECS resource.
pub trait RouteProvider: Send + Sync {
    /// Compute a driving route. `Ok(None)` means the service answered but
    /// found no route; `Err` means the service could not be used at all.
    fn route(&self, start: Coordinate, end: Coordinate) -> Result<Option<Route>, RouteError>;
}

/// ECS resource wrapping a boxed route provider.
#[derive(Resource)]
pub struct RouteProviderResource(pub Box<dyn RouteProvider>);

/// Resolve a route, degrading instead of failing.
///
/// - a route from the provider is returned as-is;
/// - an empty answer becomes the direct `[start, end]` route;
/// - any error becomes a synthesized route with [`DEFAULT_FALLBACK_STEPS`].
pub fn fetch_route(provider: &dyn RouteProvider, start: Coordinate, end: Coordinate) -> Route {
    match provider.route(start, end) {
        Ok(Some(route)) => {
            log::debug!("routed {} -> {} with {} points", start, end, route.len());
            route
        }
        Ok(None) => {
            log::info!("no route between {} and {}, using direct path", start, end);
            Route::direct(start, end)
        }
        Err(err) => {
            log::warn!("routing failed ({}), synthesizing fallback route", err);
            generate_fallback_route(start, end, DEFAULT_FALLBACK_STEPS)
        }
    }
}

// ---------------------------------------------------------------------------
// Fallback provider (always available)
// ---------------------------------------------------------------------------

/// Offline provider: always answers with a synthesized curve.
#[derive(Debug, Clone, Copy)]
pub struct FallbackRouteProvider {
    pub steps: usize,
}

impl Default for FallbackRouteProvider {
    fn default() -> Self {
        Self {
            steps: DEFAULT_FALLBACK_STEPS,
        }
    }
}

impl RouteProvider for FallbackRouteProvider {
    fn route(&self, start: Coordinate, end: Coordinate) -> Result<Option<Route>, RouteError> {
        Ok(Some(generate_fallback_route(start, end, self.steps)))
    }
}

// ---------------------------------------------------------------------------
// Caching wrapper
// ---------------------------------------------------------------------------

type CacheKey = (u64, u64, u64, u64);

fn cache_key(start: Coordinate, end: Coordinate) -> CacheKey {
    (
        start.latitude.to_bits(),
        start.longitude.to_bits(),
        end.latitude.to_bits(),
        end.longitude.to_bits(),
    )
}

/// LRU-cached wrapper around any [`RouteProvider`].
///
/// Cache key is the exact bit pattern of both endpoints (directional).
/// Only routes are cached; empty answers and errors are retried next time.
pub struct CachedRouteProvider {
    inner: Box<dyn RouteProvider>,
    cache: Mutex<LruCache<CacheKey, Route>>,
}

impl CachedRouteProvider {
    pub fn new(inner: Box<dyn RouteProvider>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn cached_len(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
    }
}

impl RouteProvider for CachedRouteProvider {
    fn route(&self, start: Coordinate, end: Coordinate) -> Result<Option<Route>, RouteError> {
        let key = cache_key(start, end);

        // Fast path: cache hit
        if let Ok(mut cache) = self.cache.lock() {
            if let Some(cached) = cache.get(&key) {
                return Ok(Some(cached.clone()));
            }
        }

        let result = self.inner.route(start, end)?;

        if let Some(ref route) = result {
            if let Ok(mut cache) = self.cache.lock() {
                cache.put(key, route.clone());
            }
        }

        Ok(result)
    }
}

// ---------------------------------------------------------------------------
// Factory: build a provider from RouteProviderKind
// ---------------------------------------------------------------------------

/// Default route cache capacity for network providers.
#[cfg(feature = "osrm")]
const DEFAULT_ROUTE_CACHE_CAPACITY: usize = 256;

/// Which routing backend to use.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub enum RouteProviderKind {
    /// Synthesized routes only, no network.
    #[default]
    Fallback,
    /// OSRM HTTP endpoint (e.g. `"https://router.project-osrm.org"`).
    #[cfg(feature = "osrm")]
    Osrm { endpoint: String },
}

/// Construct a boxed [`RouteProvider`] from a [`RouteProviderKind`] descriptor.
///
/// OSRM is wrapped in a [`CachedRouteProvider`]; if its HTTP client cannot be
/// built the synthesized provider is used instead.
pub fn build_route_provider(kind: &RouteProviderKind) -> Box<dyn RouteProvider> {
    match kind {
        RouteProviderKind::Fallback => Box::new(FallbackRouteProvider::default()),

        #[cfg(feature = "osrm")]
        RouteProviderKind::Osrm { endpoint } => match osrm::OsrmRouteProvider::new(endpoint) {
            Ok(provider) => Box::new(CachedRouteProvider::new(
                Box::new(provider),
                DEFAULT_ROUTE_CACHE_CAPACITY,
            )),
            Err(err) => {
                log::warn!(
                    "failed to build OSRM client for '{}': {}; using synthesized routes",
                    endpoint,
                    err
                );
                Box::new(FallbackRouteProvider::default())
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::geo::distance_meters;

    const EPS: f64 = 1e-9;

    fn start() -> Coordinate {
        Coordinate::new(12.9216, 77.5446)
    }

    fn end() -> Coordinate {
        Coordinate::new(12.9716, 77.5946)
    }

    struct Failing;

    impl RouteProvider for Failing {
        fn route(&self, _: Coordinate, _: Coordinate) -> Result<Option<Route>, RouteError> {
            Err(RouteError::Unavailable("offline".to_string()))
        }
    }

    struct Empty;

    impl RouteProvider for Empty {
        fn route(&self, _: Coordinate, _: Coordinate) -> Result<Option<Route>, RouteError> {
            Ok(None)
        }
    }

    struct Counting(Arc<AtomicUsize>);

    impl RouteProvider for Counting {
        fn route(&self, start: Coordinate, end: Coordinate) -> Result<Option<Route>, RouteError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(Some(Route::new(vec![start, end], RouteSource::Routed).expect("route")))
        }
    }

    #[test]
    fn route_rejects_fewer_than_two_points() {
        assert_eq!(
            Route::new(vec![start()], RouteSource::Routed),
            Err(RouteBuildError(1))
        );
        assert!(Route::new(vec![], RouteSource::Routed).is_err());
    }

    #[test]
    fn fallback_route_has_steps_plus_one_points_and_exact_ends() {
        let route = generate_fallback_route(start(), end(), 30);
        assert_eq!(route.len(), 31);
        assert!(!route.is_empty());
        assert_eq!(route.source(), RouteSource::Fallback);
        assert!(route.origin().approx_eq(&start(), EPS));
        assert!(route.destination().approx_eq(&end(), EPS));
    }

    #[test]
    fn fallback_route_bows_away_from_the_straight_line() {
        let route = generate_fallback_route(start(), end(), 30);
        let straight = lerp(start(), end(), 0.5);
        let mid = route.get(15).expect("midpoint");
        // t = 0.5 -> sin(pi) + sin(1.5 pi) * 0.001 = -0.001
        assert!((mid.latitude - (straight.latitude - 0.001)).abs() < 1e-9);
        assert!((mid.longitude - (straight.longitude + 0.0007)).abs() < 1e-9);
    }

    #[test]
    fn fallback_route_with_zero_steps_still_has_two_points() {
        assert_eq!(generate_fallback_route(start(), end(), 0).len(), 2);
    }

    #[test]
    fn remaining_distance_shrinks_along_the_route() {
        let route = generate_fallback_route(start(), end(), 10);
        assert!((route.remaining_meters(0) - route.length_meters()).abs() < EPS);
        assert_eq!(route.remaining_meters(route.len() - 1), 0.0);
        assert_eq!(route.remaining_meters(route.len() + 3), 0.0);
        for i in 1..route.len() {
            assert!(route.remaining_meters(i) <= route.remaining_meters(i - 1));
        }
        assert!(route.length_meters() >= distance_meters(route.origin(), route.destination()));
    }

    #[test]
    fn fetch_route_falls_back_on_error() {
        let route = fetch_route(&Failing, start(), end());
        assert_eq!(route.len(), DEFAULT_FALLBACK_STEPS + 1);
        assert_eq!(route.source(), RouteSource::Fallback);
    }

    #[test]
    fn fetch_route_uses_direct_path_on_empty_answer() {
        let route = fetch_route(&Empty, start(), end());
        assert_eq!(route.len(), 2);
        assert_eq!(route.source(), RouteSource::Direct);
        assert!(route.origin().approx_eq(&start(), EPS));
        assert!(route.destination().approx_eq(&end(), EPS));
    }

    #[test]
    fn cached_provider_only_queries_inner_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cached = CachedRouteProvider::new(Box::new(Counting(calls.clone())), 4);

        let first = cached.route(start(), end()).expect("ok").expect("route");
        let second = cached.route(start(), end()).expect("ok").expect("route");
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cached.cached_len(), 1);

        cached.route(end(), start()).expect("ok");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn cached_provider_does_not_cache_errors() {
        let cached = CachedRouteProvider::new(Box::new(Failing), 4);
        assert!(cached.route(start(), end()).is_err());
        assert_eq!(cached.cached_len(), 0);
    }

    #[test]
    fn default_kind_builds_offline_provider() {
        assert_eq!(RouteProviderKind::default(), RouteProviderKind::Fallback);
        let provider = build_route_provider(&RouteProviderKind::Fallback);
        let route = fetch_route(provider.as_ref(), start(), end());
        assert_eq!(route.source(), RouteSource::Fallback);
        assert_eq!(route.len(), 31);
    }
}
