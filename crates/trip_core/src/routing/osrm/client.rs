use std::time::Duration;

use reqwest::{blocking::Client, Url};

use crate::error::RouteError;
use crate::geo::Coordinate;
use crate::routing::{Route, RouteProvider};

use super::parser::decode_route_body;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Routes via an OSRM HTTP endpoint.
#[derive(Debug, Clone)]
pub struct OsrmRouteProvider {
    client: Client,
    endpoint: String,
}

impl OsrmRouteProvider {
    /// Create a provider for the given endpoint (e.g. `http://localhost:5000`).
    pub fn new(endpoint: &str) -> Result<Self, RouteError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    fn route_url(&self, start: Coordinate, end: Coordinate) -> Result<Url, RouteError> {
        let base = format!(
            "{}/route/v1/driving/{},{};{},{}",
            self.endpoint, start.longitude, start.latitude, end.longitude, end.latitude,
        );
        let mut url = Url::parse(&base)
            .map_err(|err| RouteError::Api(format!("failed to build OSRM URL: {}", err)))?;
        url.query_pairs_mut()
            .append_pair("overview", "full")
            .append_pair("geometries", "geojson");
        Ok(url)
    }
}

impl RouteProvider for OsrmRouteProvider {
    fn route(&self, start: Coordinate, end: Coordinate) -> Result<Option<Route>, RouteError> {
        let url = self.route_url(start, end)?;
        log::debug!("requesting OSRM route: {}", url);
        let body = self.client.get(url).send()?.text()?;
        decode_route_body(&body)
    }
}
