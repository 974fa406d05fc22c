#[derive(serde::Deserialize)]
pub(super) struct OsrmRouteResponse {
    pub(super) code: String,
    pub(super) message: Option<String>,
    pub(super) routes: Option<Vec<OsrmRoute>>,
}

#[derive(serde::Deserialize)]
pub(super) struct OsrmRoute {
    pub(super) geometry: OsrmGeometry,
}

#[derive(serde::Deserialize)]
pub(super) struct OsrmGeometry {
    /// GeoJSON positions, `[lng, lat]`.
    pub(super) coordinates: Vec<Vec<f64>>,
}
