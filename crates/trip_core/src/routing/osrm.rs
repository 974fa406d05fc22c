//! OSRM `/route` integration.
//!
//! Payload decoding is always compiled so it can be tested offline; the HTTP
//! client itself sits behind the `osrm` feature. OSRM speaks `[lng, lat]`,
//! everything past this module is latitude-first.

mod parser;
mod response;

#[cfg(feature = "osrm")]
mod client;

#[cfg(feature = "osrm")]
pub use client::OsrmRouteProvider;
pub use parser::decode_route_body;
