use crate::error::RouteError;
use crate::geo::Coordinate;
use crate::routing::{Route, RouteSource};

use super::response::OsrmRouteResponse;

/// Decode an OSRM `/route` JSON body.
///
/// Returns `Ok(None)` when OSRM answered `Ok` without a usable geometry. Any
/// other code, `NoRoute` and `NoSegment` included, is an error so the caller
/// degrades to the synthesized curve.
pub fn decode_route_body(body: &str) -> Result<Option<Route>, RouteError> {
    let parsed: OsrmRouteResponse =
        serde_json::from_str(body).map_err(|err| RouteError::Malformed(err.to_string()))?;
    parse_route_response(parsed)
}

pub(super) fn parse_route_response(
    resp: OsrmRouteResponse,
) -> Result<Option<Route>, RouteError> {
    if resp.code != "Ok" {
        let detail = match resp.message {
            Some(message) => format!("{}: {}", resp.code, message),
            None => resp.code,
        };
        return Err(RouteError::Api(detail));
    }

    let Some(route) = resp.routes.and_then(|routes| routes.into_iter().next()) else {
        return Ok(None);
    };

    let points = route
        .geometry
        .coordinates
        .iter()
        .map(|position| match position.as_slice() {
            // OSRM returns [lng, lat], we store (lat, lng)
            [lng, lat, ..] => Ok(Coordinate::new(*lat, *lng)),
            _ => Err(RouteError::Malformed(format!(
                "position with {} values",
                position.len()
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Route::new(points, RouteSource::Routed).ok())
}
